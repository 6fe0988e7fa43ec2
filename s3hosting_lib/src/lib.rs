//! Declares a static website hosting stack: an S3 bucket origin, a
//! CloudFront distribution in front of it, a bucket policy that only admits
//! requests carrying the distribution's secret `Referer` header, and a Route53
//! alias record for the domain. The result is a CloudFormation template.

pub mod app;
pub mod context;
mod error;
pub mod intrinsic;
pub mod resources;
pub mod secret;
pub mod stack;
pub mod template;

pub use app::App;
pub use context::AppContext;
pub use error::{Error, Result};
pub use stack::{Environment, HostingProps, S3HostingStack, StackIdentity};
pub use template::Template;
