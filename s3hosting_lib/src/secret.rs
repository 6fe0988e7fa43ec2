/// The value CloudFront sends to the origin in the `Referer` header and that
/// the bucket policy requires before serving objects.
///
/// A derived secret is the md5 of the stack id. Anyone who can guess the stack
/// id can compute it, so it only keeps casual traffic off the bucket website
/// endpoint. It is not authentication. Prefer [`OriginSecret::provided`] with a
/// random value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginSecret {
    value: String,
    derived: bool,
}

impl OriginSecret {
    pub fn derive(stack_id: &str) -> Self {
        let digest = md5::compute(stack_id.as_bytes());
        Self {
            value: format!("{:x}", digest),
            derived: true,
        }
    }

    pub fn provided(value: &str) -> Self {
        Self {
            value: value.to_string(),
            derived: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_derived(&self) -> bool {
        self.derived
    }
}
