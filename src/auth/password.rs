use bcrypt::{hash, verify};

/// 单向密码摘要与校验
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, bcrypt::BcryptError>;

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, bcrypt::BcryptError>;
}

/// bcrypt 实现
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl CredentialHasher for BcryptHasher {
    fn hash(&self, plaintext: &str) -> Result<String, bcrypt::BcryptError> {
        hash(plaintext.as_bytes(), self.cost)
    }

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, bcrypt::BcryptError> {
        verify(plaintext.as_bytes(), digest)
    }
}
