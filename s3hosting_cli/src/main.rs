use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use s3hosting_lib::{App, AppContext, Environment, S3HostingStack};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "s3hosting", version, about = "Synthesize and deploy an S3 + CloudFront static website stack")]
struct Cli {
    /// context values as key=value. `env` names the environment to synthesize.
    #[arg(short = 'c', long = "context", global = true, value_name = "KEY=VALUE")]
    context: Vec<String>,

    /// json file holding `{"context": {...}}`. defaults to ./s3hosting.json if present.
    #[arg(long, global = true)]
    context_file: Option<PathBuf>,

    #[arg(long, global = true, env = "S3HOSTING_DEFAULT_ACCOUNT")]
    account: Option<String>,

    #[arg(long, global = true, env = "S3HOSTING_DEFAULT_REGION")]
    region: Option<String>,

    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// print or write the CloudFormation template
    Synth {
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// synthesize and submit the template to CloudFormation
    Deploy,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Cli {
    fn default_environment(&self) -> Environment {
        Environment {
            account: self.account.clone(),
            region: self.region.clone().or_else(|| std::env::var("AWS_REGION").ok()),
        }
    }

    fn app(&self) -> Result<App> {
        let mut context = AppContext::load(self.context_file.as_deref())?;
        for arg in &self.context {
            context.set_arg(arg)?;
        }
        Ok(App::new(context, self.default_environment()))
    }
}

fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}

fn render(stack: &S3HostingStack, format: Format) -> Result<String> {
    let template = stack.to_template()?;
    let body = match format {
        Format::Json => template.to_json()?,
        Format::Yaml => template.to_yaml()?,
    };
    Ok(body)
}

async fn run(cli: &Cli) -> Result<()> {
    let app = cli.app()?;
    let stack = app.synth()?;
    match &cli.command {
        Commands::Synth { output, format } => {
            let body = render(&stack, *format)?;
            match output {
                Some(path) => {
                    std::fs::write(path, body)
                        .with_context(|| format!("Failed to write template to {:?}", path))?;
                    info!(path = ?path, stack = stack.name(), "wrote template");
                }
                None => println!("{body}"),
            }
        }
        Commands::Deploy => {
            let body = render(&stack, Format::Json)?;
            let region = stack.identity().environment.region.clone();
            let client = aws_cfn_stack::client_for_region(region).await;
            let outputs = aws_cfn_stack::deploy_stack(&client, stack.name(), &body)
                .await
                .with_context(|| format!("Failed to deploy stack {}", stack.name()))?;
            for (key, value) in outputs {
                println!("{}.{key} = {value}", stack.name());
            }
        }
    }
    Ok(())
}

/// usage errors exit with 2, anything else that failed with 1.
fn exit_status(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => match e.downcast_ref::<s3hosting_lib::Error>() {
            Some(s3hosting_lib::Error::Usage) => 2,
            _ => 1,
        },
    }
}

fn report(result: &Result<()>) -> ExitCode {
    if let Err(e) = result {
        if exit_status(result) == 2 {
            eprintln!("{e}");
        } else {
            eprintln!("Error: {e:#}");
        }
    }
    ExitCode::from(exit_status(result))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    report(&run(&cli).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_context_flags() {
        let cli = Cli::try_parse_from([
            "s3hosting", "synth", "-c", "env=example.com", "--context", "x=y", "--format", "yaml",
        ]).unwrap();
        assert_eq!(cli.context, vec!["env=example.com".to_string(), "x=y".to_string()]);
        match cli.command {
            Commands::Synth { format, output } => {
                assert_eq!(format, Format::Yaml);
                assert!(output.is_none());
            }
            _ => panic!("expected synth"),
        }
    }

    #[test]
    fn explicit_flags_set_default_environment() {
        let cli = Cli::try_parse_from([
            "s3hosting", "deploy", "--account", "123", "--region", "us-east-1", "-vv",
        ]).unwrap();
        assert_eq!(cli.verbose, 2);
        let env = cli.default_environment();
        assert_eq!(env.account.as_deref(), Some("123"));
        assert_eq!(env.region.as_deref(), Some("us-east-1"));
    }

    #[test]
    fn no_env_in_context_is_usage_error() {
        let dir = std::env::temp_dir().join("s3hosting-cli-test-missing.json");
        let cli = Cli::try_parse_from([
            "s3hosting", "synth", "--context-file", dir.to_str().unwrap(),
        ]).unwrap();
        // explicit file that does not exist fails before synth
        assert!(cli.app().is_err());

        let cli = Cli::try_parse_from(["s3hosting", "synth", "-c", "env="]).unwrap();
        let mut context = AppContext::new();
        for arg in &cli.context {
            context.set_arg(arg).unwrap();
        }
        let err = App::new(context, cli.default_environment()).synth().unwrap_err();
        assert!(matches!(err, s3hosting_lib::Error::Usage));
    }

    #[tokio::test]
    async fn missing_env_exits_with_usage_status() {
        let cli = Cli::try_parse_from(["s3hosting", "synth", "-c", "env="]).unwrap();
        let result = run(&cli).await;
        assert!(result.is_err());
        assert_eq!(exit_status(&result), 2);
    }

    #[test]
    fn other_failures_exit_with_one() {
        let err: anyhow::Error = s3hosting_lib::Error::InvalidProps {
            env: "example.com".into(),
            message: "missing required fields: domainName".into(),
        }
        .into();
        assert_eq!(exit_status(&Err(err)), 1);
        let wrapped: Result<()> = Err(anyhow::anyhow!("disk full")).context("Failed to write template");
        assert_eq!(exit_status(&wrapped), 1);
        assert_eq!(exit_status(&Ok(())), 0);
    }

    #[test]
    fn usage_status_survives_added_context() {
        let result: Result<()> = Err(s3hosting_lib::Error::Usage).context("while synthesizing");
        assert_eq!(exit_status(&result), 2);
    }

    #[test]
    fn renders_both_formats() {
        let mut context = AppContext::new();
        context.set_arg("env=example.com").unwrap();
        context.set_arg(r#"example.com={"domainName":"example.com","hostedZoneName":"example.com","acmCertificateArn":"arn:aws:acm:us-east-1:1:certificate/xyz"}"#).unwrap();
        let stack = App::new(context, Environment::default()).synth().unwrap();
        let json = render(&stack, Format::Json).unwrap();
        assert!(json.contains("\"AWS::CloudFront::Distribution\""));
        let yaml = render(&stack, Format::Yaml).unwrap();
        assert!(yaml.contains("AWS::Route53::RecordSet"));
    }
}
