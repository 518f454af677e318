use clap::Parser;
use reinforce::cli::Options;
use reinforce::logging::{DisplayLogger, StatsLogger, TensorBoardLogger};
use reinforce::Trainer;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let opts = Options::parse();
    let config = opts.trainer_config()?;
    println!("{:#?}", config);

    let mut trainer = Trainer::new(config)?;
    let mut logger: Box<dyn StatsLogger> = match opts.tensorboard_dir() {
        Some(dir) => {
            println!("Logging to TensorBoard in {}", dir.display());
            Box::new((DisplayLogger::new(), TensorBoardLogger::new(dir)))
        }
        None => Box::new(DisplayLogger::new()),
    };

    trainer.run(logger.as_mut(), |summary| println!("{}", summary))?;
    println!(
        "Saved reward history to {}",
        trainer.config().history_path().display()
    );
    Ok(())
}
