//! 会话令牌生成
//!
//! 令牌 = UUIDv7（16 字节，保证唯一并大致按时间排序）+ 13 字节系统随机数（保证不可预测），
//! 拼接后以 base58 编码，不含 `0 O I l` 等易混淆字符，可直接放入 URL 与 Cookie。

use rand::RngCore;
use rand::rngs::OsRng;
use uuid::Uuid;

/// 令牌中独立随机部分的字节数
pub const RANDOM_BYTES: usize = 13;

const UUID_BYTES: usize = 16;

/// 生成新的会话令牌
pub fn issue() -> String {
    let mut bytes = [0u8; UUID_BYTES + RANDOM_BYTES];
    bytes[..UUID_BYTES].copy_from_slice(Uuid::now_v7().as_bytes());
    OsRng.fill_bytes(&mut bytes[UUID_BYTES..]);

    bs58::encode(bytes).into_string()
}
