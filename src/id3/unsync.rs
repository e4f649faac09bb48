// Reversal of the ID3v2 unsynchronisation scheme

/// Undo unsynchronisation in place.
///
/// Writers insert a zero byte after every `0xFF`, so each `FF 00` pair is
/// turned back into a lone `FF`.
pub fn decode_unsynchronisation(data: &mut Vec<u8>) {
    let mut dst = 0;
    let mut last = 0u8;

    for src in 0..data.len() {
        let byte = data[src];
        if !(last == 0xFF && byte == 0x00) {
            data[dst] = byte;
            dst += 1;
        }
        last = byte;
    }

    data.truncate(dst);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(bytes: &[u8]) -> Vec<u8> {
        let mut data = bytes.to_vec();
        decode_unsynchronisation(&mut data);
        data
    }

    #[test]
    fn inserted_zeros_are_removed() {
        assert_eq!(decoded(&[0xFF, 0x00, 0xFE]), [0xFF, 0xFE]);
        assert_eq!(decoded(&[0x01, 0xFF, 0x00, 0xE0, 0xFF, 0x00]), [0x01, 0xFF, 0xE0, 0xFF]);
    }

    #[test]
    fn only_one_zero_per_ff() {
        // FF 00 00 was written as FF 00 00 00
        assert_eq!(decoded(&[0xFF, 0x00, 0x00, 0x00]), [0xFF, 0x00, 0x00]);
        assert_eq!(decoded(&[0xFF, 0x00, 0xFF, 0x00]), [0xFF, 0xFF]);
    }

    #[test]
    fn plain_data_is_untouched() {
        assert_eq!(decoded(b"Summary"), b"Summary");
        assert_eq!(decoded(&[0x00, 0xFF]), [0x00, 0xFF]);
        assert!(decoded(&[]).is_empty());
    }
}
