use ollama_vision::{OllamaClient, OllamaVisionConfig, VisionBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let image_path = std::env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: describe_image <image_path> [model]");
        std::process::exit(1);
    });

    let model = std::env::args().nth(2).unwrap_or("llava:7b".to_string());

    let client = OllamaClient::new(OllamaVisionConfig::default());
    let image = std::fs::read(&image_path)?;

    println!("Describing {} with model '{}'...", image_path, model);

    let caption = client
        .invoke(&model, "Describe this image clearly.", &image)
        .await?;
    println!("Caption: {}", caption);

    let tags = ollama_vision::split_tags(
        &client
            .invoke(
                &model,
                "Generate 5 short keyword tags separated by commas.",
                &image,
            )
            .await?,
    );
    println!("Tags ({}):", tags.len());
    for tag in &tags {
        println!("  - {}", tag);
    }

    Ok(())
}
