use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{Cli, Commands};
use redscout::engine::{
    self, CancelController, CancelReason, Candidates, Mode, Progress, RunConfig, RunResult,
    TerminationReason,
};
use redscout::tools::hashcrack::{self, HashAlgo};
use redscout::tools::{dns, pdf, portscan, subdomains};

fn print_ascii_logo() {
    println!(
        r#"
        ____  _____ ____  ____   ____ ___  _   _ _____
       |  _ \| ____|  _ \/ ___| / ___/ _ \| | | |_   _|
       | |_) |  _| | | | \___ \| |  | | | | | | | | |
       |  _ <| |___| |_| |___) | |__| |_| | |_| | | |
       |_| \_\_____|____/|____/ \____\___/ \___/  |_|

                 Security Toolkit v0.1.0
    "#
    );
}

pub async fn run_from_cli(cli: Cli) -> Result<()> {
    // Configure logging based on global flags. Keep external crates
    // (reqwest/hyper/hickory) at INFO to avoid flooding the CLI.
    use tracing_subscriber::EnvFilter;
    let crate_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    let filter_str = format!(
        "redscout={crate},reqwest=info,hyper=info,hickory_resolver=info,hickory_proto=info",
        crate = crate_level
    );
    let env_filter =
        EnvFilter::try_new(&filter_str).unwrap_or_else(|_| EnvFilter::new(crate_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(true)
        .with_target(false)
        .init();

    print_ascii_logo();

    // One controller per invocation; Ctrl-C trips it so every tool stops the
    // same way and still reports partial results.
    let ctrl = CancelController::new();
    {
        let ctrl = ctrl.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, stopping dispatch");
                ctrl.trip(CancelReason::Interrupted);
            }
        });
    }

    let deadline = cli.deadline.map(Duration::from_secs);

    match cli.command {
        Commands::Dns {
            domain,
            types,
            nameserver,
            output,
        } => run_dns(domain, types, nameserver, output, ctrl, deadline).await,
        Commands::Subdomains {
            domain,
            wordlist,
            workers,
            timeout,
            output,
        } => run_subdomains(domain, wordlist, workers, timeout, output, ctrl, deadline).await,
        Commands::PdfProtect {
            input,
            output,
            password,
            owner_password,
        } => run_pdf_protect(input, output, password, owner_password),
        Commands::PdfCrack {
            pdf,
            wordlist,
            brute,
            min_len,
            max_len,
            charset,
            length_ceiling,
            workers,
        } => {
            run_pdf_crack(
                pdf,
                wordlist,
                brute,
                min_len,
                max_len,
                charset,
                length_ceiling,
                workers,
                ctrl,
                deadline,
            )
            .await
        }
        Commands::Portscan {
            target,
            ports,
            workers,
            connect_timeout,
            first_open,
            json,
        } => {
            run_portscan(
                target,
                ports,
                workers,
                connect_timeout,
                first_open,
                json,
                ctrl,
                deadline,
            )
            .await
        }
        Commands::Hashcrack {
            hash,
            algo,
            wordlist,
            brute,
            min_len,
            max_len,
            charset,
            length_ceiling,
            workers,
        } => {
            run_hashcrack(
                hash,
                algo,
                wordlist,
                brute,
                min_len,
                max_len,
                charset,
                length_ceiling,
                workers,
                ctrl,
                deadline,
            )
            .await
        }
    }
}

fn make_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(t) => {
            let pb = ProgressBar::new(t);
            pb.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} {percent:>3}% [{wide_bar:.cyan/blue}] {pos}/{len} ({eta} remaining)",
                )
                .expect("valid progress template"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner:.green} {pos} probed ({per_sec})")
                    .expect("valid progress template"),
            );
            pb
        }
    }
}

/// Drives the bar off the engine's progress snapshot at a fixed cadence,
/// decoupled from per-outcome accounting.
fn spawn_ticker(pb: ProgressBar, progress: Arc<Progress>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_millis(150)).await;
            let snap = progress.snapshot();
            if let Some(total) = snap.total {
                pb.set_length(total);
            }
            pb.set_position(snap.completed);
        }
    })
}

fn reason_text(reason: TerminationReason) -> &'static str {
    match reason {
        TerminationReason::Completed => "completed",
        TerminationReason::MatchFound => "match found",
        TerminationReason::Cancelled => "cancelled by user",
        TerminationReason::DeadlineExceeded => "deadline exceeded",
    }
}

fn print_summary<C, P>(result: &RunResult<C, P>) {
    let total = result
        .total
        .map(|t| t.to_string())
        .unwrap_or_else(|| "?".to_string());
    println!(
        "\n[#] {}: {}/{} probed, {} hits, {} errors in {:.2?}",
        reason_text(result.reason),
        result.completed,
        total,
        result.hits.len(),
        result.errors,
        result.elapsed
    );
    if result.reason == TerminationReason::Cancelled {
        println!("[!] Interrupted, results are partial");
    }
}

fn announce_clamp<C>(source: &Candidates<C>) {
    if let Some(notice) = source.clamp_notice() {
        println!(
            "[!] Max length {} exceeds the safety ceiling, clamped to {}",
            notice.requested_max_len, notice.applied_max_len
        );
    }
}

fn parse_charset(charset: Option<String>, default: Vec<char>) -> Vec<char> {
    match charset {
        Some(s) if !s.is_empty() => s.chars().collect(),
        _ => default,
    }
}

async fn run_dns(
    domain: String,
    types: Vec<String>,
    nameserver: Option<IpAddr>,
    output: Option<PathBuf>,
    ctrl: CancelController,
    deadline: Option<Duration>,
) -> Result<()> {
    let type_names: Vec<String> = if types.is_empty() {
        dns::DEFAULT_RECORD_TYPES.iter().map(|s| s.to_string()).collect()
    } else {
        types
    };
    let record_types = dns::parse_record_types(&type_names)?;

    println!("[>] DNS enumeration for: {domain}");
    if let Some(ns) = nameserver {
        println!("[~] Nameserver: {ns}");
    }

    let enumerator = dns::DnsEnumerator::new(&domain, nameserver);
    let source = Candidates::from_values(record_types);
    let cfg = RunConfig {
        workers: 4,
        probe_timeout: Duration::from_secs(10),
        mode: Mode::Exhaustive,
        deadline,
    };
    let progress = Arc::new(Progress::new());

    let result = engine::run(source, cfg, ctrl, progress, move |rtype| {
        let enumerator = enumerator.clone();
        async move { enumerator.query(rtype).await }
    })
    .await;

    let mut report_lines: Vec<String> = Vec::new();
    for hit in &result.hits {
        println!("\n[+] {} records:", hit.candidate);
        report_lines.push(format!("{} records:", hit.candidate));
        for record in &hit.payload {
            println!("      {record}");
            report_lines.push(format!("  {record}"));
        }
        report_lines.push(String::new());
    }
    if result.hits.is_empty() {
        println!("\n[-] No records found");
    }

    print_summary(&result);

    if let Some(path) = output {
        redscout::output::write_lines(&path, &report_lines)?;
        println!("[>] Report saved to {}", path.display());
    }
    Ok(())
}

async fn run_subdomains(
    domain: String,
    wordlist: PathBuf,
    workers: usize,
    timeout: u64,
    output: PathBuf,
    ctrl: CancelController,
    deadline: Option<Duration>,
) -> Result<()> {
    let source = Candidates::wordlist(&wordlist)?;

    println!("[>] Subdomain enumeration for: {domain}");
    println!("[~] Wordlist: {} | workers: {workers}", wordlist.display());

    let scanner = subdomains::SubdomainScanner::new(&domain, timeout);
    let cfg = RunConfig {
        workers,
        // Backstop above two sequential scheme attempts at the request timeout.
        probe_timeout: Duration::from_secs(timeout * 2 + 2),
        mode: Mode::Exhaustive,
        deadline,
    };
    let progress = Arc::new(Progress::new());
    let pb = make_bar(source.total());
    let ticker = spawn_ticker(pb.clone(), progress.clone());

    let pb_probe = pb.clone();
    let result = engine::run(source, cfg, ctrl, progress, move |label: String| {
        let scanner = scanner.clone();
        let pb = pb_probe.clone();
        async move {
            let res = scanner.check(&label).await;
            if let Ok(Some(hit)) = &res {
                pb.println(format!("[+] Discovered: {} ({})", hit.url, hit.status));
            }
            res
        }
    })
    .await;

    ticker.abort();
    pb.finish_and_clear();
    print_summary(&result);

    if result.hits.is_empty() {
        println!("[-] No subdomains discovered");
    } else {
        let mut urls: Vec<&str> = result.hits.iter().map(|h| h.payload.url.as_str()).collect();
        urls.sort_unstable();
        redscout::output::write_lines(&output, &urls)?;
        println!(
            "[>] {} subdomains saved to {}",
            urls.len(),
            output.display()
        );
    }
    Ok(())
}

fn run_pdf_protect(
    input: PathBuf,
    output: PathBuf,
    password: String,
    owner_password: Option<String>,
) -> Result<()> {
    println!("[>] Protecting {}", input.display());
    pdf::protect(&input, &output, &password, owner_password.as_deref())?;
    println!("[+] Encrypted copy saved to {}", output.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_pdf_crack(
    pdf_path: PathBuf,
    wordlist: Option<PathBuf>,
    brute: bool,
    min_len: usize,
    max_len: usize,
    charset: Option<String>,
    length_ceiling: usize,
    workers: usize,
    ctrl: CancelController,
    deadline: Option<Duration>,
) -> Result<()> {
    let source = match (&wordlist, brute) {
        (Some(path), _) => Candidates::wordlist(path)?,
        (None, true) => Candidates::keyspace(
            parse_charset(charset, pdf::default_charset()),
            min_len,
            max_len,
            length_ceiling,
        ),
        (None, false) => bail!("provide either --wordlist or --brute"),
    };
    announce_clamp(&source);

    println!("[>] Cracking {}", pdf_path.display());
    let cracker = pdf::PdfCracker::open(&pdf_path)?;

    let cfg = RunConfig {
        workers,
        probe_timeout: Duration::from_secs(30),
        mode: Mode::FirstMatch,
        deadline,
    };
    let progress = Arc::new(Progress::new());
    let pb = make_bar(source.total());
    let ticker = spawn_ticker(pb.clone(), progress.clone());

    let result = engine::run(source, cfg, ctrl, progress, move |password: String| {
        let cracker = cracker.clone();
        async move {
            let matched =
                tokio::task::spawn_blocking(move || cracker.try_password(&password)).await??;
            Ok(matched.then_some(()))
        }
    })
    .await;

    ticker.abort();
    pb.finish_and_clear();
    print_summary(&result);

    match result.hits.first() {
        Some(hit) => println!("[+] PASSWORD FOUND: {}", hit.candidate),
        None if result.reason == TerminationReason::Completed => {
            println!("[-] Password not found in the search space")
        }
        None => {}
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_portscan(
    target: String,
    ports: String,
    workers: usize,
    connect_timeout: u64,
    first_open: bool,
    json: Option<PathBuf>,
    ctrl: CancelController,
    deadline: Option<Duration>,
) -> Result<()> {
    let (start, end) = portscan::parse_port_range(&ports)?;
    let ip = portscan::resolve_target(&target).await?;
    println!("[>] Scanning {target} ({ip})");
    println!("[~] Ports: {start}-{end} | workers: {workers}");

    let source = Candidates::port_range(start, end);
    let connect_timeout = Duration::from_millis(connect_timeout);
    let cfg = RunConfig {
        workers,
        // Backstop above connect plus banner read.
        probe_timeout: connect_timeout + Duration::from_secs(2),
        mode: if first_open { Mode::FirstMatch } else { Mode::Exhaustive },
        deadline,
    };
    let progress = Arc::new(Progress::new());
    let pb = make_bar(source.total());
    let ticker = spawn_ticker(pb.clone(), progress.clone());

    let result = engine::run(source, cfg, ctrl, progress, move |port: u16| async move {
        portscan::probe_port(ip, port, connect_timeout).await
    })
    .await;

    ticker.abort();
    pb.finish_and_clear();

    let mut open: Vec<&portscan::OpenPort> = result.hits.iter().map(|h| &h.payload).collect();
    open.sort_unstable_by_key(|p| p.port);

    if open.is_empty() {
        println!("[-] No open ports found");
    } else {
        println!("[+] OPEN PORTS:");
        println!("    {:<8} {:<16} {}", "PORT", "SERVICE", "STATUS");
        for port in &open {
            println!("    {:<8} {:<16} open", port.port, port.service);
            if let Some(banner) = &port.banner {
                println!("             banner: {banner}");
            }
        }
    }

    print_summary(&result);

    if let Some(path) = json {
        redscout::output::write_json(&path, &open)?;
        println!("[>] JSON report saved to {}", path.display());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_hashcrack(
    hash: String,
    algo: HashAlgo,
    wordlist: Option<PathBuf>,
    brute: bool,
    min_len: usize,
    max_len: usize,
    charset: Option<String>,
    length_ceiling: usize,
    workers: usize,
    ctrl: CancelController,
    deadline: Option<Duration>,
) -> Result<()> {
    let target = Arc::new(hashcrack::normalize_target(algo, &hash)?);
    let source = match (&wordlist, brute) {
        (Some(path), _) => Candidates::wordlist(path)?,
        (None, true) => Candidates::keyspace(
            parse_charset(charset, hashcrack::default_charset()),
            min_len,
            max_len,
            length_ceiling,
        ),
        (None, false) => bail!("provide either --wordlist or --brute"),
    };
    announce_clamp(&source);

    println!("[>] Cracking {algo:?} hash: {target}");

    let cfg = RunConfig {
        workers,
        probe_timeout: Duration::from_secs(5),
        mode: Mode::FirstMatch,
        deadline,
    };
    let progress = Arc::new(Progress::new());
    let pb = make_bar(source.total());
    let ticker = spawn_ticker(pb.clone(), progress.clone());

    let result = engine::run(source, cfg, ctrl, progress, move |candidate: String| {
        let target = target.clone();
        async move {
            let matched = hashcrack::digest_hex(algo, candidate.as_bytes()) == *target;
            Ok(matched.then_some(()))
        }
    })
    .await;

    ticker.abort();
    pb.finish_and_clear();
    print_summary(&result);

    match result.hits.first() {
        Some(hit) => println!("[+] PASSWORD FOUND: {}", hit.candidate),
        None if result.reason == TerminationReason::Completed => {
            println!("[-] Password not found in the search space")
        }
        None => {}
    }
    Ok(())
}
