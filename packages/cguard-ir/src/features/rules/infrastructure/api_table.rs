/*
 * Built-in API table
 *
 * Argument roles for the libc routines the analysis understands. Anything
 * absent from the table (and from user registrations) is an unknown callee:
 * pointer arguments escape and the return value is Unknown.
 */

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::features::rules::domain::ApiSpec;

/// Library routines that read their arguments and retain nothing
const LIBRARY: &[&str] = &[
    "strlen", "strnlen", "strcmp", "strncmp", "strcasecmp", "strncasecmp", "strchr", "strrchr",
    "strstr", "strspn", "strcspn", "strpbrk", "strtok", "memcmp", "memchr", "puts", "fputs",
    "putchar", "fputc", "putc", "fflush", "fclose", "fopen", "perror", "atoi", "atol", "atoll",
    "atof", "strtol", "strtoul", "strtoll", "strtoull", "strtod", "toupper", "tolower", "isdigit",
    "isalpha", "isalnum", "isspace", "isupper", "islower", "exit", "abort", "assert", "qsort",
    "close", "write", "send", "fwrite",
];

pub static BUILTIN_APIS: Lazy<FxHashMap<&'static str, ApiSpec>> = Lazy::new(|| {
    let mut table: FxHashMap<&'static str, ApiSpec> = FxHashMap::default();

    // Unbounded copies
    for name in ["strcpy", "stpcpy", "wcscpy"] {
        table.insert(name, ApiSpec::copy(0, 1));
    }
    for name in ["strcat", "wcscat"] {
        table.insert(name, ApiSpec::copy(0, 1).appending());
    }

    // Bounded copies
    for name in ["strncpy", "memcpy", "memmove", "strlcpy", "stpncpy"] {
        table.insert(name, ApiSpec::bounded_copy(0, Some(1), 2));
    }
    for name in ["strncat", "strlcat"] {
        table.insert(name, ApiSpec::bounded_copy(0, Some(1), 2).appending());
    }
    table.insert("memset", ApiSpec::bounded_copy(0, None, 2));

    // Formatting
    table.insert("sprintf", ApiSpec::format(0, 1));
    table.insert("vsprintf", ApiSpec::format(0, 1));
    table.insert("snprintf", ApiSpec::bounded_format(0, 1, 2));
    table.insert("vsnprintf", ApiSpec::bounded_format(0, 1, 2));
    table.insert("printf", ApiSpec::print(0));
    table.insert("vprintf", ApiSpec::print(0));
    for name in ["fprintf", "vfprintf", "dprintf", "syslog"] {
        table.insert(name, ApiSpec::print(1));
    }

    // Input
    table.insert("gets", ApiSpec::unbounded_input(0));
    table.insert("fgets", ApiSpec::bounded_input(0, Some(1)));
    table.insert("read", ApiSpec::bounded_input(1, Some(2)));
    table.insert("recv", ApiSpec::bounded_input(1, Some(2)));
    table.insert("fread", ApiSpec::bounded_input(0, None));
    table.insert("getline", ApiSpec::bounded_input(0, None));
    table.insert("scanf", ApiSpec::scan(0, 1));
    table.insert("fscanf", ApiSpec::scan(1, 2));
    table.insert("sscanf", ApiSpec::scan(1, 2));

    // Lifecycle
    for name in ["malloc", "calloc", "realloc", "strdup", "strndup"] {
        table.insert(name, ApiSpec::allocator());
    }
    table.insert("free", ApiSpec::deallocator());

    table.insert("getenv", ApiSpec::taint_source());

    for name in LIBRARY {
        table.insert(name, ApiSpec::library());
    }

    table
});

/// Snapshot of the built-in table as owned entries
pub fn builtin_apis() -> impl Iterator<Item = (&'static str, ApiSpec)> {
    BUILTIN_APIS.iter().map(|(name, spec)| (*name, *spec))
}
