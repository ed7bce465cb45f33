//! Stamp terms.

use super::value::java_double_text;
use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use veriopt_ir::{PointerKind, Stamp};

/// Encode a stamp as `Name arg...`.
///
/// Float stamps are only encodable when `encode_float_stamps` is on;
/// `encode_int_masks` switches integer stamps to the masked form.
pub fn encode_stamp(stamp: &Stamp, config: &ExportConfig) -> Result<String> {
    match stamp {
        Stamp::Illegal => Ok("IllegalStamp".to_string()),
        Stamp::Integer(s) if config.encode_int_masks => Ok(format!(
            "IntegerStampM {} ({}) ({}) 0x{:x} 0x{:x}",
            s.bits, s.lower, s.upper, s.must_be_set, s.may_be_set
        )),
        Stamp::Integer(s) => Ok(format!("IntegerStamp {} ({}) ({})", s.bits, s.lower, s.upper)),
        Stamp::Float(s) if config.encode_float_stamps => Ok(format!(
            "FloatStamp {} ({}) ({})",
            s.bits,
            java_double_text(s.lower),
            java_double_text(s.upper)
        )),
        Stamp::Object(s) => Ok(format!(
            "ObjectStamp ''{}'' {} {} {}",
            s.type_name.as_deref().unwrap_or("null"),
            bool_term(s.exact),
            bool_term(s.non_null),
            bool_term(s.always_null)
        )),
        Stamp::Pointer(p) if !matches!(p.kind, PointerKind::Other(_)) => Ok(format!(
            "{} {} {}",
            p.kind.name(),
            bool_term(p.non_null),
            bool_term(p.always_null)
        )),
        Stamp::Void => Ok("VoidStamp".to_string()),
        other => Err(ExportError::UnsupportedStamp(format!(
            "{}: {:?}",
            other.kind_name(),
            other
        ))),
    }
}

#[inline]
fn bool_term(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veriopt_ir::{FloatStamp, IntegerStamp, PointerStamp};

    fn plain() -> ExportConfig {
        ExportConfig::default()
    }

    #[test]
    fn test_integer_stamp_plain() {
        let s = Stamp::int_range(32, -5, 5);
        assert_eq!(encode_stamp(&s, &plain()).unwrap(), "IntegerStamp 32 (-5) (5)");
    }

    #[test]
    fn test_integer_stamp_masked() {
        let config = plain().with_int_masks(true);
        let s = Stamp::int_range(32, -5, 5);
        assert_eq!(
            encode_stamp(&s, &config).unwrap(),
            "IntegerStampM 32 (-5) (5) 0x0 0xffffffff"
        );
        let c = Stamp::Integer(IntegerStamp::new(8, 10, 10));
        assert_eq!(encode_stamp(&c, &config).unwrap(), "IntegerStampM 8 (10) (10) 0xa 0xa");
    }

    #[test]
    fn test_float_stamp_needs_flag() {
        let s = Stamp::Float(FloatStamp::new(64, 0.0, 1e10));
        let err = encode_stamp(&s, &plain()).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedStamp(_)));
        assert!(err.to_string().starts_with("unhandled stamp: FloatStamp: "));

        let config = plain().with_float_stamps(true);
        assert_eq!(encode_stamp(&s, &config).unwrap(), "FloatStamp 64 (0.0) (1.0E10)");
    }

    #[test]
    fn test_object_stamps() {
        assert_eq!(
            encode_stamp(&Stamp::allocated("pkg.Point"), &plain()).unwrap(),
            "ObjectStamp ''pkg.Point'' True True False"
        );
        assert_eq!(
            encode_stamp(&Stamp::null(), &plain()).unwrap(),
            "ObjectStamp ''null'' False False True"
        );
    }

    #[test]
    fn test_pointer_stamps() {
        let klass = Stamp::Pointer(PointerStamp {
            kind: PointerKind::Klass,
            non_null: true,
            always_null: false,
        });
        assert_eq!(encode_stamp(&klass, &plain()).unwrap(), "KlassPointerStamp True False");

        let other = Stamp::Pointer(PointerStamp {
            kind: PointerKind::Other("NarrowOopStamp".into()),
            non_null: false,
            always_null: false,
        });
        let err = encode_stamp(&other, &plain()).unwrap_err();
        assert!(err.to_string().starts_with("unhandled stamp: NarrowOopStamp"));
    }

    #[test]
    fn test_void_and_illegal() {
        assert_eq!(encode_stamp(&Stamp::Void, &plain()).unwrap(), "VoidStamp");
        assert_eq!(encode_stamp(&Stamp::Illegal, &plain()).unwrap(), "IllegalStamp");
    }
}
