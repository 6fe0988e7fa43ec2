use tracing::info;

use crate::context::AppContext;
use crate::stack::{Environment, HostingProps, S3HostingStack, StackIdentity};
use crate::template::MAX_STACK_NAME_LEN;
use crate::{Error, Result};

/// context key naming which environment to synthesize.
pub const ENV_CONTEXT_KEY: &str = "env";

/// Entry point: picks the environment named in the context, reads its
/// properties and builds exactly one stack from them.
#[derive(Debug, Clone)]
pub struct App {
    context: AppContext,
    defaults: Environment,
}

impl App {
    pub fn new(context: AppContext, defaults: Environment) -> Self {
        Self { context, defaults }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// the `env` context value. absent, empty or non-string is a usage error.
    pub fn environment_name(&self) -> Result<String> {
        match self.context.try_get(ENV_CONTEXT_KEY).and_then(|v| v.as_str()) {
            Some(name) if !name.trim().is_empty() => Ok(name.trim().to_string()),
            _ => Err(Error::Usage),
        }
    }

    pub fn props(&self, env_name: &str) -> Result<HostingProps> {
        let invalid = |message: String| Error::InvalidProps {
            env: env_name.to_string(),
            message,
        };
        let value = self
            .context
            .try_get(env_name)
            .ok_or_else(|| invalid(format!("no configuration found under context key '{env_name}'")))?;
        let props: HostingProps = serde_json::from_value(value.clone()).map_err(|e| invalid(e.to_string()))?;
        let missing = props.missing_fields();
        if !missing.is_empty() {
            return Err(invalid(format!("missing required fields: {}", missing.join(", "))));
        }
        Ok(props)
    }

    pub fn synth(&self) -> Result<S3HostingStack> {
        let env_name = self.environment_name()?;
        let props = self.props(&env_name)?;
        let environment = self.defaults.merged_with(props.env.as_ref());
        let stack_name = match &props.stack_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => default_stack_name(&env_name),
        };
        let identity = StackIdentity::new(&stack_name, environment)?;
        info!(
            env = %env_name,
            stack = %identity.name,
            account = identity.environment.account.as_deref().unwrap_or("-"),
            region = identity.environment.region.as_deref().unwrap_or("-"),
            "synthesizing stack"
        );
        S3HostingStack::new(identity, props)
    }
}

/// `example.com` -> `example-com-hosting`. names that would not start with
/// a letter get an `s-` prefix, and the result is cut to 128 characters.
pub fn default_stack_name(env_name: &str) -> String {
    let base: String = env_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let base = base.trim_matches('-');
    let mut stack_name = if base.is_empty() {
        "hosting".to_string()
    } else {
        format!("{base}-hosting")
    };
    if !stack_name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        stack_name.insert_str(0, "s-");
    }
    // every char is ascii at this point, so byte truncation is safe
    stack_name.truncate(MAX_STACK_NAME_LEN);
    stack_name.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn example_props() -> serde_json::Value {
        json!({
            "domainName": "example.com",
            "hostedZoneName": "example.com",
            "acmCertificateArn": "arn:aws:acm:us-east-1:123456789012:certificate/xyz",
        })
    }

    fn defaults() -> Environment {
        Environment {
            account: Some("123456789012".into()),
            region: Some("us-east-1".into()),
        }
    }

    #[test]
    fn missing_env_is_a_usage_error() {
        let mut ctx = AppContext::new();
        ctx.insert("example.com", example_props());
        let app = App::new(ctx, defaults());
        assert!(matches!(app.synth(), Err(Error::Usage)));
    }

    #[test]
    fn empty_or_non_string_env_is_a_usage_error() {
        for value in [json!(""), json!("   "), json!(5), json!(null)] {
            let mut ctx = AppContext::new();
            ctx.insert("env", value);
            ctx.insert("example.com", example_props());
            let app = App::new(ctx, defaults());
            assert!(matches!(app.synth(), Err(Error::Usage)));
        }
    }

    #[test]
    fn usage_is_checked_before_props() {
        // no env and no props: still the usage error, not a props error
        let app = App::new(AppContext::new(), defaults());
        assert!(matches!(app.synth(), Err(Error::Usage)));
    }

    #[test]
    fn example_environment_builds_one_stack() {
        let mut ctx = AppContext::new();
        ctx.set_arg("env=example.com").unwrap();
        ctx.insert("example.com", example_props());
        let stack = App::new(ctx, defaults()).synth().unwrap();
        assert_eq!(stack.name(), "example-com-hosting");
        assert_eq!(stack.identity().environment, defaults());
        assert_eq!(stack.distribution().distribution_config.aliases, vec!["example.com".to_string()]);
        assert_eq!(stack.origin_header_secret(), stack.policy_condition_secret());
    }

    #[test]
    fn props_env_and_stack_name_override_defaults() {
        let mut props = example_props();
        props["env"] = json!({ "region": "eu-west-1" });
        props["stackName"] = json!("blog-hosting");
        let mut ctx = AppContext::new();
        ctx.set_arg("env=example.com").unwrap();
        ctx.insert("example.com", props);
        let stack = App::new(ctx, defaults()).synth().unwrap();
        assert_eq!(stack.name(), "blog-hosting");
        assert_eq!(stack.identity().environment.account.as_deref(), Some("123456789012"));
        assert_eq!(stack.identity().environment.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn missing_props_for_env() {
        let mut ctx = AppContext::new();
        ctx.set_arg("env=other.com").unwrap();
        ctx.insert("example.com", example_props());
        let err = App::new(ctx, defaults()).synth().unwrap_err();
        assert!(matches!(err, Error::InvalidProps { ref env, .. } if env == "other.com"));
    }

    #[test]
    fn incomplete_props_for_env() {
        let mut ctx = AppContext::new();
        ctx.set_arg("env=example.com").unwrap();
        ctx.insert("example.com", json!({ "domainName": "example.com", "hostedZoneName": "", "acmCertificateArn": "x" }));
        let err = App::new(ctx, defaults()).synth().unwrap_err();
        assert!(err.to_string().contains("hostedZoneName"));
    }

    #[test]
    fn invalid_explicit_stack_name() {
        let mut props = example_props();
        props["stackName"] = json!("not_valid");
        let mut ctx = AppContext::new();
        ctx.set_arg("env=example.com").unwrap();
        ctx.insert("example.com", props);
        assert!(matches!(App::new(ctx, defaults()).synth(), Err(Error::InvalidStackName { .. })));
    }

    #[test]
    fn stack_name_derivation() {
        assert_eq!(default_stack_name("example.com"), "example-com-hosting");
        assert_eq!(default_stack_name("blog.kefiwild.com"), "blog-kefiwild-com-hosting");
        assert_eq!(default_stack_name(".weird_name."), "weird-name-hosting");
        assert_eq!(default_stack_name("..."), "hosting");
    }

    #[test]
    fn derived_stack_name_gets_letter_prefix() {
        assert_eq!(default_stack_name("1password.com"), "s-1password-com-hosting");
        assert_eq!(default_stack_name("_9.io"), "s-9-io-hosting");
    }

    #[test]
    fn derived_stack_name_is_cut_to_max_length() {
        let env = format!("{}.com", "a".repeat(130));
        let name = default_stack_name(&env);
        assert_eq!(name.len(), MAX_STACK_NAME_LEN);
        assert!(crate::template::validate_stack_name(&name).is_ok());
        // a cut that lands on a separator does not leave a trailing '-'
        let env = format!("{}.b", "a".repeat(127));
        assert_eq!(default_stack_name(&env), "a".repeat(127));
    }

    #[test]
    fn synth_accepts_env_names_that_need_fixing_up() {
        for env in ["1password.com".to_string(), format!("{}.com", "a".repeat(130))] {
            let mut ctx = AppContext::new();
            ctx.insert("env", json!(env));
            ctx.insert(&env, example_props());
            let stack = App::new(ctx, defaults()).synth().unwrap();
            assert!(stack.name().len() <= MAX_STACK_NAME_LEN);
            assert!(stack.name().starts_with(|c: char| c.is_ascii_alphabetic()));
        }
    }
}
