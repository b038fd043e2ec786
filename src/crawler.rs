use crate::cli::Args;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::future::Future;
use url::Url;

lazy_static::lazy_static! {
    static ref PROFILE_HREF_REGEX: Regex = Regex::new(
        r"adoptions/pet-details/\d+"
    ).unwrap();
}

const LISTING_PATH: &str = "/adoptions/smalls";

/// Walks the paginated smalls listing and collects profile URLs
pub struct Crawler {
    client: Client,
    base: Url,
    args: Args,
}

impl Crawler {
    /// Create a new crawler instance
    pub fn new(args: Args) -> Result<Self, Box<dyn std::error::Error>> {
        let base = Url::parse(&args.base_url)?;
        base.host_str().ok_or("Invalid base URL: no host")?;

        let client = Client::builder()
            .user_agent("FattestSmalls/0.1 (Adoption Listing Crawler)")
            .timeout(std::time::Duration::from_millis(args.timeout))
            .build()?;

        Ok(Crawler { client, base, args })
    }

    /// The configured HTTP client, shared with the extractor phase
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Fetch listing pages in order until one yields no profile links
    pub async fn crawl(&self) -> Vec<String> {
        self.crawl_with(|page| self.fetch_listing(page)).await
    }

    /// Crawl loop with the page fetch injected. A page with zero profile
    /// links ends the crawl; a failed fetch truncates it instead of
    /// failing the run. Accumulated links survive either way.
    async fn crawl_with<F, Fut>(&self, fetch: F) -> Vec<String>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = Result<String, Box<dyn std::error::Error>>>,
    {
        let mut found = Vec::new();

        for page in 0..self.args.max_pages {
            let html = match fetch(page).await {
                Ok(body) => body,
                Err(e) => {
                    eprintln!("Error fetching smalls: {}", e);
                    break;
                }
            };

            let links = extract_profile_links(&html, &self.base);
            if links.is_empty() {
                // End of the listing. Assumes the directory has no gaps.
                break;
            }

            if self.args.verbose {
                println!("[page {}] {} profile links", page, links.len());
            }
            found.extend(links);
        }

        dedup_urls(found)
    }

    async fn fetch_listing(&self, page: u32) -> Result<String, Box<dyn std::error::Error>> {
        let url = listing_url(&self.base, page)?;
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Page 0 is the bare listing path; later pages use the page query parameter
fn listing_url(base: &Url, page: u32) -> Result<Url, url::ParseError> {
    let mut url = base.join(LISTING_PATH)?;
    if page > 0 {
        url.set_query(Some(&format!("page={}", page)));
    }
    Ok(url)
}

/// Extract absolute profile URLs from a listing page
pub fn extract_profile_links(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if !PROFILE_HREF_REGEX.is_match(href) {
                continue;
            }
            if let Ok(resolved) = base.join(href) {
                links.push(resolved.to_string());
            }
        }
    }

    links
}

/// Drop duplicate URLs, keeping the first occurrence of each
pub fn dedup_urls(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|url| seen.insert(url.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_args() -> Args {
        Args {
            metric: false,
            base_url: "https://www.sfspca.org".to_string(),
            workers: 8,
            timeout: 1000,
            max_pages: 50,
            verbose: false,
        }
    }

    fn listing_page(ids: &[u32]) -> String {
        let anchors: String = ids
            .iter()
            .map(|id| format!(r#"<a href="/adoptions/pet-details/{}">A small</a>"#, id))
            .collect();
        format!("<html><body>{}</body></html>", anchors)
    }

    #[test]
    fn test_listing_url_pagination() {
        let base = Url::parse("https://www.sfspca.org").unwrap();

        let first = listing_url(&base, 0).unwrap();
        assert_eq!(first.as_str(), "https://www.sfspca.org/adoptions/smalls");

        let third = listing_url(&base, 2).unwrap();
        assert_eq!(third.as_str(), "https://www.sfspca.org/adoptions/smalls?page=2");
    }

    #[test]
    fn test_extract_profile_links() {
        let html = r#"
            <html>
                <body>
                    <a href="/adoptions/pet-details/12345">Mochi</a>
                    <a href="/adoptions/pet-details/678">Clover</a>
                    <a href="/adoptions/smalls?page=2">Next page</a>
                    <a href="/about-us">About</a>
                    <a href="/adoptions/pet-details/">No id</a>
                </body>
            </html>
        "#;

        let base = Url::parse("https://www.sfspca.org").unwrap();
        let links = extract_profile_links(html, &base);

        assert_eq!(
            links,
            vec![
                "https://www.sfspca.org/adoptions/pet-details/12345".to_string(),
                "https://www.sfspca.org/adoptions/pet-details/678".to_string(),
            ]
        );
    }

    #[test]
    fn test_dedup_urls_keeps_first_occurrence() {
        let urls = vec![
            "https://example.com/a".to_string(),
            "https://example.com/b".to_string(),
            "https://example.com/a".to_string(),
            "https://example.com/c".to_string(),
            "https://example.com/b".to_string(),
        ];

        let deduped = dedup_urls(urls);
        assert_eq!(
            deduped,
            vec![
                "https://example.com/a".to_string(),
                "https://example.com/b".to_string(),
                "https://example.com/c".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_crawl_stops_at_first_empty_page() {
        let crawler = Crawler::new(test_args()).unwrap();

        // Page 3 exists but must never be requested.
        let urls = crawler
            .crawl_with(|page| async move {
                match page {
                    0 => Ok(listing_page(&[1, 2])),
                    1 => Ok(listing_page(&[3, 1])),
                    2 => Ok(listing_page(&[])),
                    _ => panic!("crawled past the empty page"),
                }
            })
            .await;

        assert_eq!(
            urls,
            vec![
                "https://www.sfspca.org/adoptions/pet-details/1".to_string(),
                "https://www.sfspca.org/adoptions/pet-details/2".to_string(),
                "https://www.sfspca.org/adoptions/pet-details/3".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_crawl_fetch_error_keeps_accumulated_links() {
        let crawler = Crawler::new(test_args()).unwrap();

        let urls = crawler
            .crawl_with(|page| async move {
                match page {
                    0 => Ok(listing_page(&[7, 8])),
                    _ => Err("503 Service Unavailable".into()),
                }
            })
            .await;

        assert_eq!(
            urls,
            vec![
                "https://www.sfspca.org/adoptions/pet-details/7".to_string(),
                "https://www.sfspca.org/adoptions/pet-details/8".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_crawl_respects_page_cap() {
        let mut args = test_args();
        args.max_pages = 2;
        let crawler = Crawler::new(args).unwrap();

        let urls = crawler
            .crawl_with(|page| async move { Ok(listing_page(&[page])) })
            .await;

        assert_eq!(urls.len(), 2);
    }
}
