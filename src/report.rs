use crate::extractor::Small;
use colored::*;
use std::time::Duration;

const GRAMS_PER_OZ: f64 = 28.3495;

// Lets the summary line land on the console before browser windows steal focus
const OPEN_DELAY: Duration = Duration::from_secs(3);

/// Records tied for the maximum weight
pub fn fattest(smalls: &[Small]) -> Vec<&Small> {
    let max = match smalls.iter().map(|small| small.weight).max() {
        Some(weight) => weight,
        None => return Vec::new(),
    };
    smalls.iter().filter(|small| small.weight == max).collect()
}

fn join_names(winners: &[&Small]) -> String {
    let names: Vec<&str> = winners.iter().map(|small| small.name.as_str()).collect();
    match names.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} and {}", rest.join(", "), last),
        _ => names.first().copied().unwrap_or_default().to_string(),
    }
}

fn weight_phrase(winner: &Small, metric: bool) -> String {
    if metric {
        format!("{} grams", (GRAMS_PER_OZ * winner.weight as f64).round() as u32)
    } else {
        format!("{} lbs and {} oz.", winner.lbs, winner.oz)
    }
}

/// The full report sentence, grammar adjusted for ties
pub fn render_report(winners: &[&Small], metric: bool) -> String {
    let tie = winners.len() > 1;
    let first = winners[0];

    let intro = if tie {
        "The fattest smalls are"
    } else {
        "The fattest small is"
    };
    let verb = if tie {
        "They weigh"
    } else if first.is_female {
        "She weighs"
    } else {
        "He weighs"
    };
    let trailer = if tie {
        "Opening smalls profiles..."
    } else {
        "Opening small profile..."
    };

    format!(
        "{} {}. {} {}. {}",
        intro.yellow().bold(),
        join_names(winners).green().underline().bold(),
        verb.yellow().bold(),
        weight_phrase(first, metric).yellow().bold(),
        trailer.yellow().bold(),
    )
}

/// Print the summary and open each winner's profile after a short pause
pub async fn report(smalls: &[Small], metric: bool) {
    if smalls.is_empty() {
        println!("{}", "No smalls found. It is a sad day.".red().bold());
        return;
    }

    let winners = fattest(smalls);
    println!("{}", render_report(&winners, metric));

    tokio::time::sleep(OPEN_DELAY).await;
    for winner in &winners {
        if let Err(e) = webbrowser::open(&winner.url) {
            eprintln!("Could not open {}: {}", winner.url, e);
        }
    }
}
