use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_API_URL: &str = "https://rickandmortyapi.com/api";

#[derive(Parser, Debug)]
pub struct Args {
    /// The address episode-board should listen on. By default
    /// episode-board will listen just on the IPv4 loopback.
    #[arg(short, long)]
    address: Option<String>,

    /// The port episode-board listens on.
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Where favorites are stored.
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Base URL of the episode API.
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Most API requests in flight at once while loading the catalog.
    #[arg(long, default_value = "8")]
    max_requests: NonZeroUsize,

    /// Per-request timeout, in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

impl Args {
    pub fn addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.address
            .as_deref()
            .unwrap_or("127.0.0.1")
            .parse()
            .map(|addr: IpAddr| (addr, self.port).into())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn max_requests(&self) -> NonZeroUsize {
        self.max_requests
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["episode-board"]).unwrap();

        assert_eq!(args.addr().unwrap(), "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(args.data_dir(), Path::new("."));
        assert_eq!(args.api_url(), DEFAULT_API_URL);
        assert_eq!(args.max_requests().get(), 8);
        assert_eq!(args.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn overrides() {
        let args = Args::try_parse_from([
            "episode-board",
            "-a",
            "0.0.0.0",
            "-p",
            "3000",
            "-d",
            "/var/lib/episode-board",
            "--api-url",
            "http://localhost:9000/api",
            "--max-requests",
            "2",
            "--timeout",
            "5",
        ])
        .unwrap();

        assert_eq!(args.addr().unwrap(), "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(args.data_dir(), Path::new("/var/lib/episode-board"));
        assert_eq!(args.api_url(), "http://localhost:9000/api");
        assert_eq!(args.max_requests().get(), 2);
        assert_eq!(args.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Args::try_parse_from(["episode-board", "--max-requests", "0"]).is_err());

        let args = Args::try_parse_from(["episode-board", "-a", "localhost"]).unwrap();
        assert!(args.addr().is_err());
    }
}
