use core::fmt::Write;

use coapblock_msg::Message;

/// One-line description of a message, for trace logs
pub(crate) fn msg_summary(msg: &Message) -> String {
  let mut buf = String::with_capacity(96);
  write!(buf,
         "{:?}: {:?} {} id {} token {}",
         msg.code.kind(),
         msg.ty,
         msg.code,
         msg.id.0,
         msg.token).ok();

  if let Some(Ok(block)) = msg.block2() {
    write!(buf,
           " block2 {}/{}/{}",
           block.num(),
           u8::from(block.more()),
           block.size()).ok();
  }

  write!(buf, " with {} byte payload", msg.payload.0.len()).ok();
  buf
}
