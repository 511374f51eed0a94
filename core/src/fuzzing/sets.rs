//! Canned payload lists.

const LONG_LENGTHS: [usize; 6] = [64, 255, 256, 1024, 4096, 65535];
const REPEATS: [usize; 5] = [1, 2, 4, 8, 16];

/// Strings that commonly break parsers: empty and whitespace values,
/// quotes, NUL and control bytes, injection fragments and long runs.
pub fn bad_strings() -> Vec<String> {
    let mut strings: Vec<String> = [
        "", " ", "\t", "\r\n", "\0", "\x7f", "\u{feff}", "'", "\"", "`", "''", "\"\"", "\\",
        "%00", "%0d%0a", "-1", "0", "1e308", "NaN", "null", "undefined", "' OR '1'='1",
        "\" OR \"1\"=\"1", "<script>alert(1)</script>", "${7*7}", "{{7*7}}", "$(id)", "`id`",
        ";id", "|id",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    strings.extend(LONG_LENGTHS.iter().map(|&n| "A".repeat(n)));
    strings
}

/// `printf` conversions repeated 1 to 16 times.
pub fn format_strings() -> Vec<String> {
    ["%n", "%s", "%x", "%p", "%d"]
        .iter()
        .flat_map(|conversion| REPEATS.iter().map(move |&n| conversion.repeat(n)))
        .collect()
}

/// Directory traversal sequences and well-known sensitive paths.
pub fn bad_paths() -> Vec<String> {
    let mut paths = Vec::new();
    for traversal in ["../", "..\\", "..%2f", "%2e%2e%2f", "..%c0%af", "....//"] {
        paths.extend(REPEATS.iter().map(|&n| traversal.repeat(n)));
    }
    for target in ["etc/passwd", "windows/win.ini"] {
        paths.extend(REPEATS.iter().map(|&n| format!("{}{target}", "../".repeat(n))));
    }
    paths.extend(
        [
            "/etc/passwd",
            "/etc/shadow",
            "/proc/self/environ",
            "C:\\Windows\\win.ini",
            "/dev/null",
            "NUL",
            "CON",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    paths
}

fn mask(bits: u32) -> u128 {
    if bits >= 128 {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    }
}

/// Bit patterns for an unsigned `bits`-wide field: all clear, all set,
/// alternating `0x55..` and `0xaa..`, every single bit and every low-bit
/// run. `bits` is clamped to `1..=128`; values are sorted and unique.
pub fn bit_fields(bits: u32) -> Vec<u128> {
    let bits = bits.clamp(1, 128);
    let all = mask(bits);

    let mut values = vec![
        0,
        all,
        0x5555_5555_5555_5555_5555_5555_5555_5555 & all,
        0xaaaa_aaaa_aaaa_aaaa_aaaa_aaaa_aaaa_aaaa & all,
    ];
    values.extend((0..bits).map(|bit| 1u128 << bit));
    values.extend((1..=bits).map(mask));

    values.sort_unstable();
    values.dedup();
    values
}

/// [`bit_fields`] reinterpreted as two's complement `bits`-wide integers.
pub fn signed_bit_fields(bits: u32) -> Vec<i128> {
    let bits = bits.clamp(1, 128);
    let sign = 1u128 << (bits - 1);

    let mut values: Vec<i128> = bit_fields(bits)
        .into_iter()
        .map(|value| {
            if bits == 128 {
                value as i128
            } else if value & sign != 0 {
                (value as i128) - (1i128 << bits)
            } else {
                value as i128
            }
        })
        .collect();

    values.sort_unstable();
    values.dedup();
    values
}

/// Boundary values around the signed and unsigned limits of a `bits`-wide
/// integer. `bits` is clamped to `2..=64`; values are sorted and unique.
pub fn int_edges(bits: u32) -> Vec<i128> {
    let bits = bits.clamp(2, 64);
    let signed_max = (1i128 << (bits - 1)) - 1;
    let signed_min = -(1i128 << (bits - 1));
    let unsigned_max = (1i128 << bits) - 1;

    let mut values = vec![
        signed_min,
        signed_min + 1,
        -1,
        0,
        1,
        signed_max - 1,
        signed_max,
        signed_max + 1,
        unsigned_max - 1,
        unsigned_max,
        unsigned_max + 1,
    ];
    values.sort_unstable();
    values.dedup();
    values
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_strings_include_edge_cases() {
        let strings = bad_strings();
        assert!(strings.contains(&String::new()));
        assert!(strings.contains(&"\0".to_string()));
        assert!(strings.iter().any(|s| s.len() == 65535));
    }

    #[test]
    fn format_strings_repeat() {
        let strings = format_strings();
        assert_eq!(strings.len(), 25);
        assert!(strings.contains(&"%n%n%n%n".to_string()));
    }

    #[test]
    fn bad_paths_traverse() {
        let paths = bad_paths();
        assert!(paths.contains(&"../../etc/passwd".to_string()));
        assert!(paths.contains(&"..\\..\\".to_string()));
    }

    #[test]
    fn bit_fields_for_a_byte() {
        assert_eq!(
            bit_fields(8),
            vec![0, 1, 2, 3, 4, 7, 8, 15, 16, 31, 32, 63, 64, 0x55, 127, 128, 0xaa, 255]
        );
    }

    #[test]
    fn wide_bit_fields() {
        let fields = bit_fields(128);
        assert_eq!(fields.last(), Some(&u128::MAX));
        assert!(fields.contains(&(1u128 << 127)));
        assert_eq!(bit_fields(0), vec![0, 1]);
    }

    #[test]
    fn signed_bit_fields_for_a_byte() {
        let fields = signed_bit_fields(8);
        assert_eq!(fields.first(), Some(&-128));
        assert_eq!(fields.last(), Some(&127));
        assert!(fields.contains(&-1));
        assert!(fields.contains(&-86));
        assert!(fields.contains(&0x55));
    }

    #[test]
    fn int_edges_for_a_byte() {
        assert_eq!(
            int_edges(8),
            vec![-128, -127, -1, 0, 1, 126, 127, 128, 254, 255, 256]
        );
    }

    #[test]
    fn int_edges_for_64_bits() {
        let edges = int_edges(64);
        assert_eq!(edges.first(), Some(&(i64::MIN as i128)));
        assert!(edges.contains(&(i64::MAX as i128)));
        assert!(edges.contains(&(u64::MAX as i128)));
    }
}
