//! Sizes of C scalar types (LP64)

use crate::features::c_ir::domain::POINTER_SIZE;

/// `sizeof(type_name)` for scalar and pointer types
pub fn sizeof_type(type_name: &str) -> Option<u64> {
    let normalized = type_name
        .split_whitespace()
        .filter(|w| !matches!(*w, "const" | "volatile" | "signed" | "static" | "register"))
        .collect::<Vec<_>>()
        .join(" ");

    if normalized.ends_with('*') {
        return Some(POINTER_SIZE);
    }

    let size = match normalized.as_str() {
        "char" | "unsigned char" | "bool" | "_Bool" | "int8_t" | "uint8_t" => 1,
        "short" | "short int" | "unsigned short" | "unsigned short int" | "int16_t"
        | "uint16_t" | "wchar16_t" => 2,
        "int" | "unsigned" | "unsigned int" | "float" | "int32_t" | "uint32_t" | "wchar_t" => 4,
        "long" | "long int" | "unsigned long" | "unsigned long int" | "long long"
        | "long long int" | "unsigned long long" | "unsigned long long int" | "double"
        | "int64_t" | "uint64_t" | "size_t" | "ssize_t" | "ptrdiff_t" | "intptr_t"
        | "uintptr_t" | "off_t" => 8,
        "long double" => 16,
        _ => return None,
    };
    Some(size)
}
