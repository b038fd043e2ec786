mod cli;
mod crawler;
mod extractor;
mod report;

use cli::parse_args;
use crawler::Crawler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args();

    println!("Accessing San Francisco SPCA (Smalls Department)...");

    let crawler = Crawler::new(args.clone())?;
    let urls = crawler.crawl().await;

    println!(
        "Smalls information system accessed. {} smalls found. Beginning weighing process...",
        urls.len()
    );

    let client = crawler.client();
    let smalls = extractor::extract_all(&client, &urls, args.workers, args.verbose).await;

    report::report(&smalls, args.metric).await;

    Ok(())
}
