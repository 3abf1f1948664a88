use aes::Aes256;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::errors::CipherError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

/// AES-256-CBC cipher for the token endpoint login payload.
///
/// Key and IV are the first 32 and 16 characters of the app key, not a hash
/// of it. The vendor decrypts with the same truncation, so this must not change.
#[derive(Clone)]
pub struct CredentialCipher {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

impl CredentialCipher {
    pub fn new(app_key: &str) -> Result<Self, CipherError> {
        Ok(Self {
            key: Self::truncate::<KEY_LEN>(app_key)?,
            iv: Self::truncate::<IV_LEN>(app_key)?,
        })
    }

    fn truncate<const N: usize>(app_key: &str) -> Result<[u8; N], CipherError> {
        let prefix: String = app_key.chars().take(N).collect();

        <[u8; N]>::try_from(prefix.as_bytes()).map_err(|_| CipherError::InvalidKeyLength {
            expected: N,
            actual: prefix.len(),
        })
    }

    /// PKCS#7 padded, URL-safe base64 encoded.
    pub fn encrypt(&self, text: &str) -> String {
        let encrypted = Aes256CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(text.as_bytes());

        URL_SAFE.encode(encrypted)
    }

    pub fn decrypt(&self, cipher_text: &str) -> Result<String, CipherError> {
        let decoded = URL_SAFE.decode(cipher_text)?;
        let decrypted = Aes256CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&decoded)
            .map_err(|_| CipherError::Padding)?;

        Ok(String::from_utf8(decrypted)?)
    }
}
