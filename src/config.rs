use anyhow::{anyhow, Context};
use clap::Parser;
use std::path::Path;

pub const DEFAULT_ENV: &str = "dev";
pub const DEFAULT_LANG_CODE: &str = "fr_FR";
pub const DEFAULT_ALCOHOL_TYPE: &str = "whisky";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Site root without trailing slash.
    pub site_url: String,
    pub gql_host: String,
    pub ngrok_header: bool,
    pub lang_code: String,
    pub alcohol_type: String,
    pub port: u16,
}

/// Command line arguments.
#[derive(Parser, Clone, Debug, PartialEq, Eq)]
#[command(name = "alco-front")]
#[command(about = "Canonical URLs, page types and sitemap of the catalog front")]
pub struct Args {
    /// Environment whose env file is loaded: prod, staging or dev
    #[arg(long, default_value = DEFAULT_ENV)]
    pub env: String,

    /// Port to listen on, overrides PORT
    #[arg(long)]
    pub port: Option<u16>,
}

/// Env files to try for an environment, most specific first.
pub fn env_files(env: &str) -> [&'static str; 2] {
    let file = match env.trim().to_lowercase().as_str() {
        "prod" | "production" => ".env.production",
        "staging" => ".env.staging",
        _ => ".env.development",
    };
    [file, ".env"]
}

/// First existing env file for an environment.
pub fn resolve_env_file<F>(env: &str, exists: F) -> Option<&'static str>
where
    F: Fn(&str) -> bool,
{
    env_files(env).into_iter().find(|f| exists(f))
}

pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn load_env_file(env: &str) -> anyhow::Result<()> {
    match resolve_env_file(env, |f| Path::new(f).exists()) {
        Some(file) => {
            envmnt::load_file(file).with_context(|| format!("Unable to load {file}"))?;
            log::info!("Environment file loaded: {file}");
        }
        None => log::warn!("No environment file found for {env}"),
    }
    Ok(())
}

impl Config {
    /// Loads the env file selected by the arguments, then reads the
    /// configuration from the environment.
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        load_env_file(&args.env)?;
        let config = Self::from_lookup(
            |key| envmnt::exists(key).then(|| envmnt::get_or(key, "")),
            args.port,
        )?;
        config.log_public();
        Ok(config)
    }

    /// Logs the values that are safe to show.
    pub fn log_public(&self) {
        log::info!("Public configuration:");
        for (key, value) in self.public_vars() {
            log::info!("- {key}: {value}");
        }
    }

    pub fn public_vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("SITE_URL", self.site_url.clone()),
            ("GQL_HOST", self.gql_host.clone()),
            ("NGROK_HEADER", self.ngrok_header.to_string()),
            ("LANG_CODE", self.lang_code.clone()),
            ("ALCOHOL_TYPE", self.alcohol_type.clone()),
            ("PORT", self.port.to_string()),
        ]
    }

    pub fn from_lookup<F>(lookup: F, port: Option<u16>) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let site_url = get("SITE_URL").ok_or_else(|| anyhow!("SITE_URL is not set"))?;
        url::Url::parse(&site_url).with_context(|| format!("Invalid SITE_URL {site_url}"))?;
        let gql_host = get("GQL_HOST").ok_or_else(|| anyhow!("GQL_HOST is not set"))?;
        let port = match port {
            Some(p) => p,
            None => get("PORT")
                .map(|p| p.parse().with_context(|| format!("Invalid PORT {p}")))
                .transpose()?
                .unwrap_or(DEFAULT_PORT),
        };

        Ok(Self {
            site_url: site_url.trim_end_matches('/').to_string(),
            gql_host,
            ngrok_header: get("NGROK_HEADER").map(|v| parse_flag(&v)).unwrap_or(false),
            lang_code: get("LANG_CODE").unwrap_or_else(|| DEFAULT_LANG_CODE.to_string()),
            alcohol_type: get("ALCOHOL_TYPE").unwrap_or_else(|| DEFAULT_ALCOHOL_TYPE.to_string()),
            port,
        })
    }
}
