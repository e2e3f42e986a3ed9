pub use coapblock_msg::Code;

use crate::code_const;

// 0.xx
code_const!(rfc7252("5.8.1") GET = 0*01);

// 2.xx
code_const!(rfc7252("5.9.1.3") VALID   = 2*03);
code_const!(rfc7252("5.9.1.5") CONTENT = 2*05);

// 4.xx
code_const!(rfc7252("5.9.2.3")  BAD_OPTION         = 4*02);
code_const!(rfc7252("5.9.2.5")  NOT_FOUND          = 4*04);
code_const!(rfc7252("5.9.2.6")  METHOD_NOT_ALLOWED = 4*05);

// 5.xx
code_const!(rfc7252("5.9.3.1") INTERNAL_SERVER_ERROR = 5*00);

/// Is this a response code that carries (a block of) the representation
/// we asked for?
pub fn is_success(code: Code) -> bool {
  code == CONTENT || code == VALID
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn codes_render_as_dotted() {
    assert_eq!(GET.to_string(), "0.01");
    assert_eq!(CONTENT.to_string(), "2.05");
    assert_eq!(METHOD_NOT_ALLOWED.to_string(), "4.05");
    assert_eq!(INTERNAL_SERVER_ERROR.to_string(), "5.00");
  }

  #[test]
  fn only_content_and_valid_succeed() {
    assert!(is_success(CONTENT));
    assert!(is_success(VALID));
    assert!(!is_success(NOT_FOUND));
    assert!(!is_success(Code::new(2, 4)));
  }
}
