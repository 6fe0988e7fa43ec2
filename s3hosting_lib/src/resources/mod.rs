pub use serde::Serialize;
pub use serde_json::{json, Map, Value};

pub use crate::intrinsic::*;
pub use crate::template::CfnResource;

mod s3_bucket;
pub use s3_bucket::*;
mod bucket_policy;
pub use bucket_policy::*;
mod cloudfront;
pub use cloudfront::*;
mod route53;
pub use route53::*;
