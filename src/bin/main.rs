//! rclassify Command Line Interface
//!
//! A command-line interface for training, evaluating, and using SVM models
//! with LibSVM and CSV data formats, plus XOR demonstrations of the SVM and
//! the neural network.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rclassify::api::{EvaluationMetrics, SVMBuilder, TrainedModel};
use rclassify::core::{Prediction, Result, SVMError};
use rclassify::demo;
use rclassify::kernel::{GaussianKernel, KernelFunction};
use rclassify::persistence::SerializableModel;
use rclassify::{CSVDataset, Dataset, LibSVMDataset};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "rclassify")]
#[command(about = "Binary classification with SMO-trained SVMs and neural networks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "rclassify contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new SVM model
    Train(TrainArgs),
    /// Make predictions using a trained model
    Predict(PredictArgs),
    /// Evaluate a model on test data
    Evaluate(EvaluateArgs),
    /// Display model information
    Info(InfoArgs),
    /// Run an XOR demonstration
    Demo(DemoArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file (LibSVM or CSV format)
    #[arg(long)]
    data: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Data format: auto, libsvm, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    /// Kernel function
    #[arg(short, long, default_value = "linear")]
    kernel: CliKernel,

    /// Variance of the Gaussian kernel
    #[arg(long, default_value = "1.0")]
    variance: f64,

    /// Soft-margin parameter C
    #[arg(short = 'C', long, default_value = "1.0", conflicts_with = "hard_margin")]
    c: f64,

    /// Train a hard-margin SVM (C = inf)
    #[arg(long)]
    hard_margin: bool,

    /// Maximum number of solver passes (0 for no limit)
    #[arg(long, default_value = "10000")]
    max_passes: usize,

    /// Stop training after this many seconds
    #[arg(long)]
    time_limit: Option<u64>,

    /// Seed for the solver's random generator
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliKernel {
    /// K(x, y) = x . y
    #[value(name = "linear")]
    Linear,
    /// K(x, y) = exp(-|x - y|^2 / (2 variance))
    #[value(name = "gaussian")]
    Gaussian,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Input data file
    #[arg(long)]
    data: PathBuf,

    /// Output predictions file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Data format: auto, libsvm, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    /// Show confidence scores
    #[arg(long)]
    confidence: bool,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Test data file
    #[arg(long)]
    data: PathBuf,

    /// Data format: auto, libsvm, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    /// Show detailed metrics
    #[arg(long)]
    detailed: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

#[derive(Args)]
struct DemoArgs {
    #[command(subcommand)]
    demo: DemoKind,
}

#[derive(Subcommand)]
enum DemoKind {
    /// Gaussian SVM (variance 1, C = 100) on noisy XOR
    SvmXor {
        /// Noisy copies of each XOR point
        #[arg(long, default_value = "50")]
        copies: usize,
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// 2:2:1 neural network trained on XOR
    AnnXor {
        /// Back-propagation iterations
        #[arg(long, default_value = "1000000")]
        iterations: usize,
        /// Learning rate
        #[arg(long, default_value = "0.1")]
        eta: f64,
        /// Hidden units
        #[arg(long, default_value = "2")]
        hidden: usize,
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Info(args) => info_command(args),
        Commands::Demo(args) => demo_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn train_command(args: TrainArgs) -> Result<()> {
    info!("Training SVM model...");
    info!("Data file: {:?}", args.data);

    let format = resolve_format(&args.format, &args.data);
    info!("Loading dataset as {format} format");

    match format.as_str() {
        "libsvm" => {
            let dataset = LibSVMDataset::from_file(&args.data)?;
            train_with_dataset(&args, dataset)
        }
        "csv" => {
            let dataset = CSVDataset::from_file(&args.data)?;
            train_with_dataset(&args, dataset)
        }
        _ => Err(unsupported_format(&format)),
    }
}

fn train_with_dataset<D: Dataset>(args: &TrainArgs, dataset: D) -> Result<()> {
    info!(
        "Loaded {} samples with {} dimensions",
        dataset.len(),
        dataset.dim()
    );

    if dataset.len() < 2 {
        return Err(SVMError::InvalidDataset(
            "Dataset must contain at least 2 samples".to_string(),
        ));
    }

    let kernel = match args.kernel {
        CliKernel::Linear => KernelFunction::Linear,
        CliKernel::Gaussian => KernelFunction::Gaussian(GaussianKernel::new(args.variance)?),
    };
    info!(
        "Parameters: kernel={}, C={}, max_passes={}",
        kernel.name(),
        if args.hard_margin { f64::INFINITY } else { args.c },
        args.max_passes
    );

    let mut builder = SVMBuilder::with_kernel(kernel)
        .with_c(args.c)
        .with_max_passes(Some(args.max_passes).filter(|&n| n > 0));
    if args.hard_margin {
        builder = builder.hard_margin();
    }
    if let Some(seed) = args.seed {
        builder = builder.with_seed(seed);
    }
    if let Some(secs) = args.time_limit {
        builder = builder.with_time_limit(Duration::from_secs(secs));
    }

    let model = builder.train(&dataset)?;

    info!("Training completed successfully");
    if !model.report().converged {
        warn!("Solver budget exhausted; the model may be suboptimal");
    }

    let info = model.info();
    info!("Support vectors: {}", info.n_support_vectors);
    info!("Bias: {:.6}", info.bias);

    let serializable = SerializableModel::from_trained_model(&model);
    serializable.save_to_file(&args.output)?;
    info!("Model saved to: {:?}", args.output);

    // Quick evaluation on training data
    let accuracy = model.evaluate(&dataset)?;
    info!("Training accuracy: {:.2}%", accuracy * 100.0);

    Ok(())
}

fn load_model(path: &Path) -> Result<(SerializableModel, TrainedModel<KernelFunction>)> {
    info!("Loading model from: {path:?}");
    let serializable = SerializableModel::load_from_file(path)?;
    let model = serializable.to_trained_model()?;
    Ok((serializable, model))
}

fn predict_command(args: PredictArgs) -> Result<()> {
    let (serializable, model) = load_model(&args.model)?;

    info!("Loading prediction data from: {:?}", args.data);
    let format = resolve_format(&args.format, &args.data);

    info!(
        "Making predictions using model with {} support vectors",
        serializable.metadata.n_support_vectors
    );

    let predictions = match format.as_str() {
        "libsvm" => model.predict_from_file(&args.data)?,
        "csv" => model.predict_from_csv(&args.data)?,
        _ => return Err(unsupported_format(&format)),
    };

    match args.output {
        Some(output_path) => {
            let file = File::create(&output_path).map_err(SVMError::IoError)?;
            let mut writer = BufWriter::new(file);
            write_predictions(&mut writer, &predictions, args.confidence)
                .map_err(SVMError::IoError)?;
            writer.flush().map_err(SVMError::IoError)?;
            info!("Predictions saved to: {output_path:?}");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            write_predictions(&mut handle, &predictions, args.confidence)
                .map_err(SVMError::IoError)?;
        }
    }

    Ok(())
}

fn write_predictions<W: Write>(
    writer: &mut W,
    predictions: &[Prediction],
    confidence: bool,
) -> std::io::Result<()> {
    writeln!(writer, "# Predictions for {} samples", predictions.len())?;
    writeln!(
        writer,
        "# Format: sample_index predicted_label{}",
        if confidence { " confidence" } else { "" }
    )?;

    for (i, pred) in predictions.iter().enumerate() {
        if confidence {
            writeln!(writer, "{} {} {:.6}", i, pred.label, pred.confidence())?;
        } else {
            writeln!(writer, "{} {}", i, pred.label)?;
        }
    }
    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    let (serializable, model) = load_model(&args.model)?;

    info!("Loading test data from: {:?}", args.data);
    let format = resolve_format(&args.format, &args.data);

    info!(
        "Evaluating model with {} support vectors",
        serializable.metadata.n_support_vectors
    );

    let metrics = match format.as_str() {
        "libsvm" => {
            let dataset = LibSVMDataset::from_file(&args.data)?;
            let dataset = match model.inner().dim() {
                Some(dim) => dataset.with_dim(dim)?,
                None => dataset,
            };
            model.evaluate_detailed(&dataset)?
        }
        "csv" => {
            let dataset = CSVDataset::from_file(&args.data)?;
            model.evaluate_detailed(&dataset)?
        }
        _ => return Err(unsupported_format(&format)),
    };

    println!("=== Model Evaluation ===");
    serializable.print_summary();

    println!("\nTest Results:");
    println!("  Accuracy: {:.2}%", metrics.accuracy() * 100.0);

    if args.detailed {
        print_metrics(&metrics);
    }

    Ok(())
}

fn print_metrics(metrics: &EvaluationMetrics) {
    println!("\nDetailed Metrics:");
    println!("  True Positives:  {}", metrics.true_positives);
    println!("  True Negatives:  {}", metrics.true_negatives);
    println!("  False Positives: {}", metrics.false_positives);
    println!("  False Negatives: {}", metrics.false_negatives);
    println!("  Precision:       {:.4}", metrics.precision());
    println!("  Recall:          {:.4}", metrics.recall());
    println!("  F1 Score:        {:.4}", metrics.f1_score());
    println!("  Specificity:     {:.4}", metrics.specificity());
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable = SerializableModel::load_from_file(&args.model)?;

    serializable.print_summary();

    println!("\nSupport Vector Details:");
    println!("  Total: {}", serializable.support_vectors.len());

    if let Some(first) = serializable.support_vectors.first() {
        println!("  Representation: {}", first.x.kind());
        println!("  Dimensions: {}", first.x.dim());
    }

    println!("\nAlpha*Y values:");
    let n_show = serializable.support_vectors.len().min(10);
    for (i, sv) in serializable.support_vectors.iter().enumerate().take(n_show) {
        println!("  α{i}*y{i}: {:.6}", sv.alpha * f64::from(sv.y));
    }
    if serializable.support_vectors.len() > n_show {
        println!("  ... ({} more)", serializable.support_vectors.len() - n_show);
    }

    Ok(())
}

fn demo_command(args: DemoArgs) -> Result<()> {
    match args.demo {
        DemoKind::SvmXor { copies, seed } => {
            let mut rng = seeded_rng(seed);
            info!("Training Gaussian SVM on {} noisy XOR samples", 4 * copies);
            let result = demo::svm_xor(copies, &mut rng)?;

            println!("=== SVM XOR ===");
            println!(
                "Support vectors: {} of {}",
                result.svm.size(),
                4 * copies
            );
            println!(
                "Passes: {}, steps: {}, converged: {}",
                result.report.passes, result.report.steps, result.report.converged
            );
            for (x, u) in &result.outputs {
                println!("{x} : {u:.6}");
            }
            Ok(())
        }
        DemoKind::AnnXor {
            iterations,
            eta,
            hidden,
            seed,
        } => {
            let mut rng = seeded_rng(seed);
            let result = demo::ann_xor(&[hidden], iterations, eta, &mut rng)?;

            println!("=== ANN XOR ===");
            println!("Untrained:");
            for (input, y) in &result.untrained {
                println!("{input:?} : {y:.6}");
            }
            println!("\nAfter {iterations} iterations (eta = {eta}):");
            for (input, y) in &result.trained {
                println!("{input:?} : {y:.6}");
            }
            Ok(())
        }
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn resolve_format(format: &str, path: &Path) -> String {
    if format == "auto" {
        detect_format(path)
    } else {
        format.to_string()
    }
}

fn unsupported_format(format: &str) -> SVMError {
    SVMError::InvalidParameter(format!(
        "Unsupported format: {format}. Use 'libsvm' or 'csv'"
    ))
}

fn detect_format(path: &Path) -> String {
    if let Some(ext) = path.extension() {
        match ext.to_str() {
            Some("csv") => "csv".to_string(),
            Some("libsvm") | Some("svm") => "libsvm".to_string(),
            _ => {
                warn!("Unknown file extension, assuming LibSVM format");
                "libsvm".to_string()
            }
        }
    } else {
        warn!("No file extension, assuming LibSVM format");
        "libsvm".to_string()
    }
}
