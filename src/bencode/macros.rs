// a macro to be used in tests to reduce boilerplate code
// informal syntax:
// -integer: as-is, works for (u8, u16, u32, u64, bool), conversion should be lossless
// -string: as-is, works for both owned and borrowed strings, becomes a byte string
// -bytes: (b1, b2, ...), support trailing comma
// -list: [e1, e2, ...], support trailing comma
// -dictionary: { (k1, v1), (k2, v2), ... }, support trailing comma (no trailing comma in K-V pair)
#[macro_export]
macro_rules! bencode_elem {
    ([ $( $element:tt ),* ]) => {
        $crate::bencode::BencodeElem::List(vec![ $( bencode_elem!($element) ),* ])
    };
    ([ $( $element:tt ),+ ,]) => {
        bencode_elem!([ $( $element ),* ])
    };
    (( $( $element:tt ),* )) => {
        $crate::bencode::BencodeElem::Bytes(vec![ $( $element ),* ])
    };
    (( $( $element:tt ),+ ,)) => {
        bencode_elem!(( $( $element ),* ))
    };
    ({ $( ($key:tt, $val:tt) ),* }) => {
        $crate::bencode::BencodeElem::Dictionary(
            vec![ $( ($key.as_bytes().to_vec(), bencode_elem!($val)) ),* ]
                .into_iter()
                .collect::<$crate::bencode::Dictionary>()
        )
    };
    ({ $( ($key:tt, $val:tt) ),+ ,}) => {
        bencode_elem!({ $( ($key, $val) ),* })
    };
    ($other:expr) => {
        $crate::bencode::BencodeElem::from($other)
    }
}

#[cfg(test)]
mod bencode_elem_macro_tests {
    use super::super::*;

    #[test]
    fn u8_to_integer_ok() {
        assert_eq!(bencode_elem!(0_u8), BencodeElem::Integer(0))
    }

    #[test]
    fn u32_to_integer_ok() {
        assert_eq!(bencode_elem!(7_u32), BencodeElem::Integer(7))
    }

    #[test]
    fn u64_to_integer_ok() {
        assert_eq!(bencode_elem!(0_u64), BencodeElem::Integer(0))
    }

    #[test]
    fn str_ref_to_bytes_ok() {
        assert_eq!(bencode_elem!("spam"), BencodeElem::Bytes(b"spam".to_vec()))
    }

    #[test]
    fn string_to_bytes_ok() {
        let string = "".to_owned();
        assert_eq!(bencode_elem!(string), BencodeElem::Bytes(vec![]))
    }

    #[test]
    fn bytes_ok() {
        assert_eq!(
            bencode_elem!((0x01, 0x02)),
            BencodeElem::Bytes(vec![0x01, 0x02])
        )
    }

    #[test]
    fn bytes_empty() {
        assert_eq!(bencode_elem!(()), BencodeElem::Bytes(vec![]))
    }

    #[test]
    fn list_ok() {
        assert_eq!(
            bencode_elem!([1_u64, "0x02", [3_u64]]),
            BencodeElem::List(vec![
                BencodeElem::Integer(1),
                BencodeElem::Bytes(b"0x02".to_vec()),
                BencodeElem::List(vec![BencodeElem::Integer(3)]),
            ])
        )
    }

    #[test]
    fn list_empty() {
        assert_eq!(bencode_elem!([]), BencodeElem::List(vec![]))
    }

    #[test]
    fn dict_ok() {
        assert_eq!(
            bencode_elem!({ ("cow", { ("moo", 4_u64) }), ("spam", "eggs") }),
            BencodeElem::dictionary(vec![
                (
                    "cow",
                    BencodeElem::dictionary(vec![("moo", BencodeElem::Integer(4))]),
                ),
                ("spam", BencodeElem::Bytes(b"eggs".to_vec())),
            ])
        )
    }

    #[test]
    fn dict_empty() {
        assert_eq!(bencode_elem!({}), BencodeElem::Dictionary(Dictionary::new()))
    }
}
