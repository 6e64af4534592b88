//! Hex dumps of scripted exchanges.

/// Bytes the collaborator sent to the peer.
pub const INBOUND: char = '>';
/// Bytes the peer wrote to the collaborator.
pub const OUTBOUND: char = '<';

/// Render `data` as lines of `{prefix}{dir} xx xx ... |ascii|`, sixteen bytes
/// per line. An empty slice yields no lines.
pub fn hexdump(prefix: &str, dir: char, data: &[u8]) -> Vec<String> {
    data.chunks(16)
        .map(|chunk| {
            let mut line = format!("{}{} ", prefix, dir);

            for (j, byte) in chunk.iter().enumerate() {
                line.push_str(&format!("{:02x} ", byte));
                if j == 7 {
                    line.push(' ');
                }
            }
            for j in chunk.len()..16 {
                line.push_str("   ");
                if j == 7 {
                    line.push(' ');
                }
            }

            line.push('|');
            for byte in chunk {
                if (0x20..0x7f).contains(byte) {
                    line.push(*byte as char);
                } else {
                    line.push('.');
                }
            }
            line.push('|');
            line
        })
        .collect()
}

/// Log a dump through `tracing` at info level.
pub fn log(dir: char, data: &[u8]) {
    for line in hexdump("GATT: ", dir, data) {
        tracing::info!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_pdu_fits_one_line() {
        let lines = hexdump("GATT: ", INBOUND, &[0x02, 0x00, 0x02]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("GATT: > 02 00 02 "));
        assert!(lines[0].ends_with("|...|"));
    }

    #[test]
    fn long_pdu_wraps_every_sixteen_bytes() {
        let pdu = [
            0x11, 0x14, 0x90, 0x00, 0x96, 0x00, 0xef, 0xcd, 0xab, 0x89, 0x67, 0x45, 0x23, 0x01,
            0x00, 0x00, 0x00, 0x00, 0x85, 0x60, 0x00, 0x00,
        ];
        let lines = hexdump("GATT: ", OUTBOUND, &pdu);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("GATT: < 11 14 90 00 96 00 ef cd  ab 89"));
        assert!(lines[1].starts_with("GATT: < 00 00 85 60 00 00 "));
        assert!(lines[1].ends_with("|...`..|"));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(hexdump("GATT: ", INBOUND, &[]).is_empty());
    }
}
