//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use fff_core::ProbeSettings;
use fff_core::probe::constants::{DEFAULT_DELAY_MS, DEFAULT_METHOD, DEFAULT_OUTPUT_DIR};

/// Request URLs provided on stdin fairly frickin' fast.
///
/// Reads one URL per line, requests each one, and prints `<url> <status>`.
/// Responses selected by the save options are written to
/// `<output>/<host>/<path>/<sha1>` and printed as `<file>: <url> <status>`.
#[derive(Parser, Debug)]
#[command(name = "fff")]
#[command(author, version, about)]
pub struct Args {
    /// Request body
    #[arg(short = 'b', long, value_name = "DATA", default_value = "")]
    pub body: String,

    /// Delay between issuing requests (ms)
    #[arg(short = 'd', long, value_name = "DELAY", default_value_t = DEFAULT_DELAY_MS)]
    pub delay: u64,

    /// Add a header to the request (can be specified multiple times)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Don't save HTML files; useful when looking for non-HTML files only
    #[arg(long)]
    pub ignore_html: bool,

    /// Don't save empty files
    #[arg(long)]
    pub ignore_empty: bool,

    /// Use HTTP Keep-Alive
    #[arg(short = 'k', long, visible_alias = "keep-alives")]
    pub keep_alive: bool,

    /// HTTP method to use (GET is sent as POST when a body is given)
    #[arg(short = 'm', long, default_value = DEFAULT_METHOD)]
    pub method: String,

    /// Save responses that include <STRING> in the body
    #[arg(short = 'M', long = "match", value_name = "STRING", default_value = "")]
    pub match_string: String,

    /// Directory to save responses in (will be created)
    #[arg(short = 'o', long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Save responses with given status code (can be specified multiple times)
    #[arg(short = 's', long = "save-status", value_name = "CODE")]
    pub save_status: Vec<u16>,

    /// Save all responses
    #[arg(short = 'S', long = "save")]
    pub save_all: bool,

    /// Use the provided HTTP proxy
    #[arg(short = 'x', long, value_name = "PROXY_URL", default_value = "")]
    pub proxy: String,

    /// Maximum requests in flight (0 for no limit)
    #[arg(short = 'c', long, default_value_t = 0)]
    pub concurrency: usize,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Default tracing level when `RUST_LOG` is unset.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Converts the parsed flags into probe settings.
    #[must_use]
    pub fn into_settings(self) -> ProbeSettings {
        ProbeSettings {
            method: self.method,
            body: self.body,
            headers: self.headers,
            save_all: self.save_all,
            save_status: self.save_status,
            ignore_html: self.ignore_html,
            ignore_empty: self.ignore_empty,
            match_string: self.match_string,
            output_dir: self.output,
            delay_ms: self.delay,
            keep_alive: self.keep_alive,
            proxy: self.proxy,
            concurrency: self.concurrency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["fff"]).unwrap();
        assert_eq!(args.delay, 100);
        assert_eq!(args.method, "GET");
        assert_eq!(args.output, PathBuf::from("out"));
        assert!(args.body.is_empty());
        assert!(args.headers.is_empty());
        assert!(args.save_status.is_empty());
        assert!(!args.save_all);
        assert!(!args.keep_alive);
        assert_eq!(args.concurrency, 0);
        assert_eq!(args.log_level(), "warn");
    }

    #[test]
    fn test_cli_short_flags() {
        let args = Args::try_parse_from([
            "fff", "-b", "a=1", "-d", "5", "-H", "X-A: 1", "-k", "-m", "PUT", "-M", "secret",
            "-o", "dump", "-s", "200", "-S", "-x", "http://127.0.0.1:8080",
        ])
        .unwrap();
        assert_eq!(args.body, "a=1");
        assert_eq!(args.delay, 5);
        assert_eq!(args.headers, vec!["X-A: 1"]);
        assert!(args.keep_alive);
        assert_eq!(args.method, "PUT");
        assert_eq!(args.match_string, "secret");
        assert_eq!(args.output, PathBuf::from("dump"));
        assert_eq!(args.save_status, vec![200]);
        assert!(args.save_all);
        assert_eq!(args.proxy, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_cli_long_flags() {
        let args = Args::try_parse_from([
            "fff",
            "--body",
            "x",
            "--delay",
            "0",
            "--header",
            "A: 1",
            "--ignore-html",
            "--ignore-empty",
            "--keep-alives",
            "--match",
            "m",
            "--output",
            "o",
            "--save-status",
            "404",
            "--save",
            "--proxy",
            "p",
            "--concurrency",
            "8",
        ])
        .unwrap();
        assert!(args.ignore_html);
        assert!(args.ignore_empty);
        assert!(args.keep_alive);
        assert_eq!(args.concurrency, 8);
        assert_eq!(args.save_status, vec![404]);
    }

    #[test]
    fn test_cli_repeatable_headers_and_statuses_keep_order() {
        let args = Args::try_parse_from([
            "fff", "-H", "B: 2", "-H", "A: 1", "-H", "B: 2", "-s", "500", "-s", "200",
        ])
        .unwrap();
        assert_eq!(args.headers, vec!["B: 2", "A: 1", "B: 2"]);
        assert_eq!(args.save_status, vec![500, 200]);
    }

    #[test]
    fn test_cli_non_numeric_status_rejected() {
        let err = Args::try_parse_from(["fff", "-s", "abc"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_verbosity_levels() {
        assert_eq!(Args::try_parse_from(["fff", "-v"]).unwrap().log_level(), "info");
        assert_eq!(Args::try_parse_from(["fff", "-vv"]).unwrap().log_level(), "debug");
        assert_eq!(Args::try_parse_from(["fff", "-vvv"]).unwrap().log_level(), "trace");
        assert_eq!(Args::try_parse_from(["fff", "-q", "-v"]).unwrap().log_level(), "error");
    }

    #[test]
    fn test_cli_into_settings_upgrades_method_in_config() {
        let config = Args::try_parse_from(["fff", "-b", "x"])
            .unwrap()
            .into_settings()
            .into_config();
        assert_eq!(&*config.method, "POST");
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["fff", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["fff", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
