use anyhow::Result;
use cinematch_engine::{Config, RecommendationService};

pub async fn run_recommend(config: Config, title: &str, explain: bool) -> Result<()> {
    let service = RecommendationService::start(&config).await?;

    if explain {
        let Some(outcome) = service.explain(title)? else {
            anyhow::bail!("Movie not found in dataset: {}", title);
        };

        for ranking in &outcome.rankings {
            println!("{}:", ranking.model);
            for (rank, (candidate, score)) in ranking.entries.iter().enumerate() {
                println!("  {}. {} ({:.4})", rank + 1, candidate, score);
            }
        }

        println!("\nVotes:");
        for (candidate, votes) in outcome.tally.iter() {
            println!("  {:>2}  {}", votes, candidate);
        }
        println!();
    }

    let recommendations = service.recommend(title).await?;
    if recommendations.is_empty() {
        anyhow::bail!("Movie not found in dataset: {}", title);
    }

    println!("Recommendations for {:?}:", title);
    for (rank, rec) in recommendations.iter().enumerate() {
        match &rec.poster_url {
            Some(url) => println!("  {}. {}  {}", rank + 1, rec.title, url),
            None => println!("  {}. {}", rank + 1, rec.title),
        }
    }

    service.shutdown();
    Ok(())
}
