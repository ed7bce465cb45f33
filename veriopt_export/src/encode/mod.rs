//! Term encoders for the leaves of a node term: stamps and values.

pub mod stamp;
pub mod value;

pub use stamp::encode_stamp;
pub use value::{
    encode_value, exception_term, java_double_text, java_float_text, string_literal, value_list,
};
