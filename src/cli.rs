use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use redscout::tools::hashcrack::HashAlgo;

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable detailed debug logging (global)
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Enable verbose logging (global)
    #[arg(long, default_value_t = false)]
    pub verbose: bool,

    /// Abort any run after this many seconds
    #[arg(long, global = true)]
    pub deadline: Option<u64>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Enumerate DNS records for a domain
    Dns {
        /// Target domain
        domain: String,

        /// Record types to query (default: A AAAA TXT SOA MX CNAME NS SRV)
        #[arg(long, num_args = 1..)]
        types: Vec<String>,

        /// Custom DNS nameserver IP
        #[arg(long)]
        nameserver: Option<IpAddr>,

        /// Save a grouped text report
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Discover live subdomains via HTTP probing of a wordlist
    Subdomains {
        /// Target domain (e.g. example.com)
        domain: String,

        /// Newline-delimited subdomain wordlist
        wordlist: PathBuf,

        /// Concurrent workers
        #[arg(short = 't', long, default_value_t = 50)]
        workers: usize,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 5)]
        timeout: u64,

        /// Output file for discovered subdomains
        #[arg(short = 'o', long, default_value = "discovered_subdomains.txt")]
        output: PathBuf,
    },

    /// Write a password-protected copy of a PDF
    PdfProtect {
        /// Input PDF
        input: PathBuf,

        /// Output PDF
        output: PathBuf,

        /// User password for the encrypted copy
        password: String,

        /// Owner password (defaults to the user password)
        #[arg(long)]
        owner_password: Option<String>,
    },

    /// Recover a PDF password from a wordlist or brute force
    PdfCrack {
        /// Encrypted PDF
        pdf: PathBuf,

        /// Password wordlist
        #[arg(short = 'w', long, conflicts_with = "brute")]
        wordlist: Option<PathBuf>,

        /// Generate candidate passwords instead of using a wordlist
        #[arg(long)]
        brute: bool,

        /// Min generated password length
        #[arg(long, default_value_t = 1)]
        min_len: usize,

        /// Max generated password length
        #[arg(long, default_value_t = 3)]
        max_len: usize,

        /// Brute-force charset (default: lowercase + digits)
        #[arg(long)]
        charset: Option<String>,

        /// Safety ceiling on generated password length
        #[arg(long, default_value_t = 4)]
        length_ceiling: usize,

        /// Concurrent workers
        #[arg(short = 't', long, default_value_t = 8)]
        workers: usize,
    },

    /// TCP connect scan of a port range
    Portscan {
        /// Target hostname or IP
        target: String,

        /// Port range, e.g. 1-1024 or a single port
        #[arg(short = 'p', long, default_value = "1-1024")]
        ports: String,

        /// Concurrent workers
        #[arg(short = 't', long, default_value_t = 200)]
        workers: usize,

        /// Connect timeout in milliseconds
        #[arg(long, default_value_t = 1000)]
        connect_timeout: u64,

        /// Stop at the first open port
        #[arg(long, default_value_t = false)]
        first_open: bool,

        /// Save open-port findings as JSON
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,
    },

    /// Crack a password hash from a wordlist or brute force
    Hashcrack {
        /// Target hash (hex)
        hash: String,

        /// Digest algorithm
        #[arg(long, value_enum, default_value = "md5")]
        algo: HashAlgo,

        /// Password wordlist
        #[arg(short = 'w', long, conflicts_with = "brute")]
        wordlist: Option<PathBuf>,

        /// Generate candidate passwords instead of using a wordlist
        #[arg(long)]
        brute: bool,

        /// Min generated password length
        #[arg(long, default_value_t = 1)]
        min_len: usize,

        /// Max generated password length
        #[arg(long, default_value_t = 4)]
        max_len: usize,

        /// Brute-force charset (default: letters + digits)
        #[arg(long)]
        charset: Option<String>,

        /// Safety ceiling on generated password length
        #[arg(long, default_value_t = 6)]
        length_ceiling: usize,

        /// Concurrent workers
        #[arg(short = 't', long, default_value_t = 8)]
        workers: usize,
    },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
