use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use odoolink_application::BulkLoadOptions;
use odoolink_core::{AppError, AppResult};
use odoolink_domain::{ApiVersion, CallContext, DEFAULT_BATCH_SIZE, EntityType};
use odoolink_infrastructure::{DatabaseCreation, HttpCredentials, OdooConnectionSettings};
use url::Url;

/// Loads a JSON array of records into one Odoo entity type.
///
/// Connection and batching settings come from the environment.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "odoolink-loader", version)]
pub struct LoadJob {
    /// Target entity type, such as `res.partner`.
    pub entity_type: EntityType,
    /// JSON file holding an array of objects.
    pub records_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub connection: OdooConnectionSettings,
    pub context: CallContext,
    pub batch_size: usize,
    pub skip_offset: usize,
    pub ignored_fields: Vec<String>,
}

impl LoaderConfig {
    /// Reads settings through `lookup`, which returns `None` for unset names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let env = Lookup(&lookup);

        let url = env.required("ODOO_URL")?;
        let url = Url::parse(url.as_str())
            .map_err(|error| AppError::Validation(format!("invalid ODOO_URL '{url}': {error}")))?;
        let database = env.required("ODOO_DATABASE")?;
        let user = env.required("ODOO_USER")?;
        let password = env.required("ODOO_PASSWORD")?;
        let api_version = match env.optional("ODOO_API_VERSION") {
            Some(value) => ApiVersion::parse(value.as_str())?,
            None => ApiVersion::default(),
        };

        let http_credentials = match (
            env.optional("ODOO_HTTP_USER"),
            env.optional("ODOO_HTTP_PASSWORD"),
        ) {
            (Some(user), Some(password)) => Some(HttpCredentials { user, password }),
            (None, None) => None,
            _ => {
                return Err(AppError::Validation(
                    "ODOO_HTTP_USER and ODOO_HTTP_PASSWORD must be set together".to_owned(),
                ));
            }
        };

        let accept_invalid_certs = env.parse_bool("ODOO_ACCEPT_INVALID_CERTS", false)?;
        let timeout_seconds = env.parse_u64("ODOO_TIMEOUT_SECONDS", 60)?;
        if timeout_seconds == 0 {
            return Err(AppError::Validation(
                "ODOO_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        let lang = env
            .optional("ODOO_CONTEXT_LANG")
            .unwrap_or_else(|| "fr_FR".to_owned());
        let noupdate = env.parse_bool("ODOO_CONTEXT_NOUPDATE", true)?;

        let create_database = if env.parse_bool("ODOO_CREATE_DATABASE", false)? {
            Some(DatabaseCreation {
                master_password: env.required("ODOO_MASTER_PASSWORD")?,
                lang: lang.clone(),
                country_code: env
                    .optional("ODOO_COUNTRY_CODE")
                    .unwrap_or_else(|| "fr".to_owned()),
                phone: String::new(),
            })
        } else {
            None
        };

        let batch_size = env.parse_usize("LOAD_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(AppError::Validation(
                "LOAD_BATCH_SIZE must be greater than zero".to_owned(),
            ));
        }
        let skip_offset = env.parse_usize("LOAD_SKIP_OFFSET", 0)?;
        let ignored_fields = env
            .optional("LOAD_IGNORE_FIELDS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|field| !field.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            connection: OdooConnectionSettings {
                url,
                database,
                user,
                password,
                api_version,
                http_credentials,
                accept_invalid_certs,
                timeout: Duration::from_secs(timeout_seconds),
                create_database,
            },
            context: CallContext::with_defaults(lang, noupdate),
            batch_size,
            skip_offset,
            ignored_fields,
        })
    }

    pub fn bulk_load_options(&self) -> BulkLoadOptions {
        BulkLoadOptions {
            ignored_fields: self.ignored_fields.clone(),
            batch_size: self.batch_size,
            skip_offset: self.skip_offset,
            context: None,
        }
    }
}

struct Lookup<'a, F>(&'a F);

impl<F> Lookup<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &str) -> AppResult<String> {
        self.optional(name)
            .ok_or_else(|| AppError::Validation(format!("{name} is required")))
    }

    fn parse_usize(&self, name: &str, default: usize) -> AppResult<usize> {
        match self.optional(name) {
            Some(value) => value.parse::<usize>().map_err(|error| {
                AppError::Validation(format!("invalid {name} value '{value}': {error}"))
            }),
            None => Ok(default),
        }
    }

    fn parse_u64(&self, name: &str, default: u64) -> AppResult<u64> {
        match self.optional(name) {
            Some(value) => value.parse::<u64>().map_err(|error| {
                AppError::Validation(format!("invalid {name} value '{value}': {error}"))
            }),
            None => Ok(default),
        }
    }

    fn parse_bool(&self, name: &str, default: bool) -> AppResult<bool> {
        match self.optional(name) {
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(AppError::Validation(format!(
                    "invalid {name} value '{value}': expected true or false"
                ))),
            },
            None => Ok(default),
        }
    }
}
