/// Opaque credential blob as handed to/from C5/C6. The store never
/// interprets the bytes — they are whatever the platform client's login
/// flow produced out-of-band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential(pub Vec<u8>);

impl Credential {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
