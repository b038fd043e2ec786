use colored::*;
use futures::stream::{self, StreamExt};
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::future::Future;

lazy_static::lazy_static! {
    static ref LBS_REGEX: Regex = Regex::new(r"(\d+)lbs\.").unwrap();
    static ref OZ_REGEX: Regex = Regex::new(r"(\d+)oz\.").unwrap();

    static ref NAME_SELECTOR: Selector =
        Selector::parse(".field-name-title h1").unwrap();
    static ref WEIGHT_SELECTOR: Selector =
        Selector::parse(".field-name-field-animal-weight .field-item").unwrap();
    static ref SPECIES_SELECTOR: Selector =
        Selector::parse(".field-name-field-animal-type .field-item").unwrap();
    static ref GENDER_SELECTOR: Selector =
        Selector::parse(".field-name-field-gender .field-item").unwrap();
}

type ParseError = Box<dyn std::error::Error + Send + Sync>;

/// One adoptable animal, parsed from its profile page
#[derive(Debug, Clone)]
pub struct Small {
    pub name: String,
    pub species: String,
    pub lbs: u32,
    pub oz: u32,
    /// Total weight in ounces, the sole comparison key
    pub weight: u32,
    pub is_female: bool,
    pub url: String,
}

/// Outcome of a profile fetch. The site sometimes serves parseable markup
/// with a non-2xx status, so transport failures are handed to the parser
/// as text instead of aborting the profile.
pub enum PageContent {
    Fetched(String),
    FetchError(String),
}

impl PageContent {
    pub fn body(&self) -> &str {
        match self {
            PageContent::Fetched(body) => body,
            PageContent::FetchError(err) => err,
        }
    }
}

/// Fetch a profile page, coercing every failure into parser input
pub async fn fetch_profile(client: &Client, url: &str) -> PageContent {
    match client.get(url).send().await {
        Ok(response) => match response.text().await {
            Ok(body) => PageContent::Fetched(body),
            Err(e) => PageContent::FetchError(e.to_string()),
        },
        Err(e) => PageContent::FetchError(e.to_string()),
    }
}

fn select_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>())
}

/// Parse one profile page into a record. The weight field is mandatory;
/// every other field degrades to an empty value.
pub fn parse_small(content: &PageContent, url: &str) -> Result<Small, ParseError> {
    let document = Html::parse_document(content.body());

    let name = select_text(&document, &NAME_SELECTOR).unwrap_or_default();
    let species = select_text(&document, &SPECIES_SELECTOR)
        .map(|text| text.trim().to_string())
        .unwrap_or_default();

    let weight_text = select_text(&document, &WEIGHT_SELECTOR).ok_or("no weight field")?;
    let lbs: u32 = LBS_REGEX
        .captures(&weight_text)
        .ok_or_else(|| format!("no lbs. match in {:?}", weight_text))?[1]
        .parse()?;
    let oz: u32 = match OZ_REGEX.captures(&weight_text) {
        Some(caps) => caps[1].parse()?,
        None => 0,
    };

    let is_female = select_text(&document, &GENDER_SELECTOR)
        .map(|text| text.trim() == "Female")
        .unwrap_or(false);

    Ok(Small {
        name,
        species,
        lbs,
        oz,
        weight: 16 * lbs + oz,
        is_female,
        url: url.to_string(),
    })
}

/// Fetch and parse every profile, at most `workers` in flight at once.
/// Profiles that fail to parse are dropped from the result.
pub async fn extract_all(
    client: &Client,
    urls: &[String],
    workers: usize,
    verbose: bool,
) -> Vec<Small> {
    extract_all_with(urls, workers, verbose, |url| fetch_profile(client, url)).await
}

/// Fan-out core with the page fetch injected. `buffered` keeps results in
/// input order regardless of which fetch finishes first; failed parses
/// leave a gap that is closed by the filter.
async fn extract_all_with<'a, F, Fut>(
    urls: &'a [String],
    workers: usize,
    verbose: bool,
    fetch: F,
) -> Vec<Small>
where
    F: Fn(&'a str) -> Fut,
    Fut: Future<Output = PageContent>,
{
    let fetch = &fetch;
    stream::iter(urls)
        .map(move |url| async move {
            let content = fetch(url).await;
            match parse_small(&content, url) {
                Ok(small) => {
                    println!(
                        "Weighing a {} named {}",
                        small.species.blue(),
                        small.name.green()
                    );
                    Some(small)
                }
                Err(e) => {
                    if verbose {
                        eprintln!("Skipping {}: {}", url, e);
                    }
                    None
                }
            }
        })
        .buffered(workers.max(1))
        .filter_map(|small| async move { small })
        .collect()
        .await
}
