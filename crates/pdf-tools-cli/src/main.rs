use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pdf_edit::{MetadataUpdate, load_pdf_bytes, save_pdf_bytes};
use pdf_task_runtime::{TaskQueue, TaskRequest, TaskResponse};

#[derive(Parser)]
#[command(name = "pdft", about = "Batch PDF editing tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge two or more PDFs into one
    Merge {
        /// Input PDF files, in output order
        #[arg(required = true, num_args = 2..)]
        inputs: Vec<PathBuf>,

        /// Output PDF file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rotate all pages by a multiple of 90 degrees
    Rotate {
        input: PathBuf,

        /// Rotation in degrees (90, 180, 270, ...)
        #[arg(short, long)]
        degrees: i32,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Password-protect a PDF
    Protect {
        input: PathBuf,

        #[arg(short, long)]
        password: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove the password from a protected PDF
    Unlock {
        input: PathBuf,

        #[arg(short, long)]
        password: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove pages, e.g. --pages "2,4-6"
    Remove {
        input: PathBuf,

        /// Page spec (1-based, ranges allowed)
        #[arg(short, long)]
        pages: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract pages into a new PDF, e.g. --pages "1,3-5"
    Extract {
        input: PathBuf,

        /// Page spec (1-based, ranges allowed)
        #[arg(short, long)]
        pages: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Reorder pages, e.g. --order "3,1,2"
    Reorder {
        input: PathBuf,

        /// Full page order (1-based, one entry per page, no ranges)
        #[arg(long)]
        order: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Stamp "Page i of N" on every page
    Number {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Stamp diagonal watermark text on every page
    Watermark {
        input: PathBuf,

        /// Watermark text
        #[arg(short, long)]
        text: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Update Info dictionary fields (missing flags keep existing values)
    Metadata {
        input: PathBuf,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        subject: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Strip form fields and annotations
    Flatten {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show page count, metadata, and encryption status
    Info { input: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let queue = TaskQueue::new();

    let (request, output) = build_request(cli.command).await?;
    let response = queue
        .submit(request)
        .await
        .map_err(|_| anyhow::anyhow!("worker stopped before replying"))?;

    match response {
        TaskResponse::Success { data, file_name } => {
            let path = output.unwrap_or_else(|| PathBuf::from(file_name));
            save_pdf_bytes(&path, &data).await?;
            println!("Wrote {}", path.display());
        }
        TaskResponse::Info { info } => {
            println!("Pages: {}", info.page_count);
            if let Some(title) = &info.title {
                println!("Title: {title}");
            }
            if let Some(author) = &info.author {
                println!("Author: {author}");
            }
            println!("Encrypted: {}", info.encrypted);
        }
        TaskResponse::Error { message } => bail!(message),
    }

    Ok(())
}

async fn build_request(command: Commands) -> Result<(TaskRequest, Option<PathBuf>)> {
    let pair = match command {
        Commands::Merge { inputs, output } => {
            let mut documents = Vec::with_capacity(inputs.len());
            for path in &inputs {
                documents.push(load_pdf_bytes(path).await?);
            }
            (TaskRequest::Merge { documents }, output)
        }
        Commands::Rotate {
            input,
            degrees,
            output,
        } => (
            TaskRequest::Rotate {
                document: load_pdf_bytes(&input).await?,
                degrees,
            },
            output,
        ),
        Commands::Protect {
            input,
            password,
            output,
        } => (
            TaskRequest::Protect {
                document: load_pdf_bytes(&input).await?,
                password,
            },
            output,
        ),
        Commands::Unlock {
            input,
            password,
            output,
        } => (
            TaskRequest::Unlock {
                document: load_pdf_bytes(&input).await?,
                password,
            },
            output,
        ),
        Commands::Remove {
            input,
            pages,
            output,
        } => (
            TaskRequest::Remove {
                document: load_pdf_bytes(&input).await?,
                pages,
            },
            output,
        ),
        Commands::Extract {
            input,
            pages,
            output,
        } => (
            TaskRequest::Extract {
                document: load_pdf_bytes(&input).await?,
                pages,
            },
            output,
        ),
        Commands::Reorder {
            input,
            order,
            output,
        } => (
            TaskRequest::Reorder {
                document: load_pdf_bytes(&input).await?,
                order,
            },
            output,
        ),
        Commands::Number { input, output } => (
            TaskRequest::Number {
                document: load_pdf_bytes(&input).await?,
            },
            output,
        ),
        Commands::Watermark {
            input,
            text,
            output,
        } => (
            TaskRequest::Watermark {
                document: load_pdf_bytes(&input).await?,
                text,
            },
            output,
        ),
        Commands::Metadata {
            input,
            title,
            author,
            subject,
            output,
        } => (
            TaskRequest::Metadata {
                document: load_pdf_bytes(&input).await?,
                update: MetadataUpdate {
                    title,
                    author,
                    subject,
                },
            },
            output,
        ),
        Commands::Flatten { input, output } => (
            TaskRequest::Flatten {
                document: load_pdf_bytes(&input).await?,
            },
            output,
        ),
        Commands::Info { input } => (
            TaskRequest::Info {
                document: load_pdf_bytes(&input).await?,
            },
            None,
        ),
    };
    Ok(pair)
}
