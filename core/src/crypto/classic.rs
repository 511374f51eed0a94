/// XORs `data` with `key` repeated. An empty key leaves the data unchanged.
pub fn xor(data: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return data.to_vec();
    }
    data.iter()
        .zip(key.iter().cycle())
        .map(|(byte, k)| byte ^ k)
        .collect()
}

/// Caesar rotation of ASCII letters by `n` places; other characters pass
/// through. `rot(text, 13)` is ROT13, negative `n` rotates back.
pub fn rot(text: &str, n: i32) -> String {
    let shift = n.rem_euclid(26) as u8;
    text.chars()
        .map(|c| match c {
            'a'..='z' => (b'a' + (c as u8 - b'a' + shift) % 26) as char,
            'A'..='Z' => (b'A' + (c as u8 - b'A' + shift) % 26) as char,
            _ => c,
        })
        .collect()
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
    fn xor_repeats_key() {
        assert_eq!(xor(b"\x00\x01\x02\x03", b"\xff\x00"), b"\xff\x01\xfd\x03");
        assert_eq!(xor(&xor(b"secret", b"k3y"), b"k3y"), b"secret");
        assert_eq!(xor(b"abc", b""), b"abc");
    }

    #[test]
    fn rot13() {
        assert_eq!(rot("Hello, World!", 13), "Uryyb, Jbeyq!");
        assert_eq!(rot(&rot("Attack at dawn", 3), -3), "Attack at dawn");
        assert_eq!(rot("xyz", 29), "abc");
    }
}
