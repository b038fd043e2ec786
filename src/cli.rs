use clap::Parser;

/// Fattest Smalls - find the heaviest adoptable animal at the SF SPCA
#[derive(Parser, Debug, Clone)]
#[command(name = "fattest-smalls")]
#[command(version = "0.1.0")]
#[command(about = "Crawl the SF SPCA smalls listing and weigh every animal", long_about = None)]
pub struct Args {
    /// Report the winning weight in grams instead of lbs/oz
    #[arg(short, long, default_value_t = false)]
    pub metric: bool,

    /// Site root the listing and profile pages live under
    #[arg(long, default_value = "https://www.sfspca.org")]
    pub base_url: String,

    /// Maximum concurrent profile fetches
    #[arg(short, long, default_value_t = 8)]
    pub workers: usize,

    /// HTTP request timeout in milliseconds
    #[arg(short = 't', long, default_value_t = 30000)]
    pub timeout: u64,

    /// Maximum number of listing pages to crawl
    #[arg(long, default_value_t = 50)]
    pub max_pages: u32,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}
