pub mod dns;
pub mod hashcrack;
pub mod pdf;
pub mod portscan;
pub mod subdomains;
