use std::{
    fs,
    path::PathBuf,
    sync::Arc,
};

use chrono::Utc;
use clap::{
    Parser,
    Subcommand,
    ValueEnum,
};
use hikki::{
    core::config::TokenizerBackend,
    init_vibrato,
    load_term_dictionary,
    AnnotationPipeline,
    DictType,
    FlashCardStore,
    HikkiError,
    Notebook,
    NotebookService,
    Settings,
    VocabularyResolver,
    VocabularyStore,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "hikki",
    about = "Japanese reading notebook: furigana, vocabulary and reviews",
    version
)]
struct Cli {
    /// Yomitan term dictionary (zip or extracted folder)
    #[arg(long, global = true, env = "HIKKI_TERM_DICTIONARY")]
    dictionary: Option<PathBuf>,

    /// Tokenizer model
    #[arg(long, global = true)]
    model: Option<Model>,

    /// Process lines and words on a single thread
    #[arg(long, global = true)]
    sequential: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Model {
    Unidic,
    Ipadic,
}

impl From<Model> for DictType {
    fn from(model: Model) -> Self {
        match model {
            Model::Unidic => DictType::Unidic,
            Model::Ipadic => DictType::Ipadic,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CardState {
    New,
    Learning,
    Acquired,
    /// New or learning cards whose review time has come
    Due,
}

#[derive(Subcommand)]
enum Command {
    /// Annotate a text file and print its HTML and word list
    Parse {
        input: PathBuf,
    },

    /// Annotate a text file and resolve its vocabulary without creating flash cards
    Analyze {
        input: PathBuf,
    },

    /// Append a text file to a notebook as a new page and register its words
    WritePage {
        /// Notebook JSON file, created if missing
        notebook: PathBuf,
        input: PathBuf,
        #[arg(long)]
        owner: String,
        #[arg(long)]
        title: Option<String>,
    },

    /// Re-parse every page of a notebook
    Reparse {
        notebook: PathBuf,
    },

    /// Record an answer quality (0-5) for a flash card
    Review {
        card: Uuid,
        quality: i32,
    },

    /// Mark a flash card as acquired
    Acquire {
        card: Uuid,
    },

    /// Store the effective settings, including the global options given here
    Configure,

    /// List a learner's flash cards with their vocabulary and meanings
    Cards {
        #[arg(long)]
        owner: String,
        #[arg(long, value_enum, default_value = "learning")]
        state: CardState,
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<(), HikkiError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load();
    if let Some(dictionary) = cli.dictionary {
        settings.term_dictionary = Some(dictionary);
    }
    if let Some(model) = cli.model {
        settings.tokenizer = TokenizerBackend::Vibrato(model.into());
    }
    if cli.sequential {
        settings.parallel = false;
    }

    match cli.command {
        Command::Parse { input } => {
            let text = fs::read_to_string(&input)?;
            let pipeline = build_pipeline(&settings)?;
            print_json(&pipeline.parse(&text, &[]))
        }
        Command::Analyze { input } => {
            let text = fs::read_to_string(&input)?;
            let app = App::open(&settings)?;
            let analysis = app.service.analyze_text(&text)?;
            app.save(&settings)?;
            print_json(&analysis)
        }
        Command::WritePage { notebook: notebook_path, input, owner, title } => {
            let text = fs::read_to_string(&input)?;
            let app = App::open(&settings)?;

            let mut notebook = Notebook::load(&notebook_path)?;
            if notebook.owner.is_empty() {
                let name = notebook_path.file_stem().unwrap_or_default().to_string_lossy();
                notebook = Notebook::new(&owner, &name, "");
            }
            let title = title.unwrap_or_else(|| {
                input.file_stem().unwrap_or_default().to_string_lossy().to_string()
            });

            let (id, failures) =
                app.service.write_page(&mut notebook, &title, &text, Utc::now())?;
            notebook.save(&notebook_path)?;
            app.save(&settings)?;

            info!("Page {} written, {} words without a dictionary entry", id, failures.len());
            print_json(&serde_json::json!({
                "page": notebook.page(id)?,
                "failures": failures,
            }))
        }
        Command::Reparse { notebook: notebook_path } => {
            let app = App::open(&settings)?;
            let mut notebook = Notebook::load(&notebook_path)?;
            let failures = app.service.redo_parsing(&mut notebook, Utc::now())?;
            notebook.save(&notebook_path)?;
            app.save(&settings)?;
            print_json(&serde_json::json!({
                "word_list": notebook.word_list(),
                "failures": failures,
            }))
        }
        Command::Review { card, quality } => {
            let cards = FlashCardStore::load(&settings.flashcard_store_path())?;
            let reviewed = cards.review(card, quality, Utc::now())?;
            cards.save(&settings.flashcard_store_path())?;
            print_json(&reviewed)
        }
        Command::Acquire { card } => {
            let cards = FlashCardStore::load(&settings.flashcard_store_path())?;
            let acquired = cards.mark_acquired(card)?;
            cards.save(&settings.flashcard_store_path())?;
            print_json(&acquired)
        }
        Command::Configure => {
            settings.save()?;
            info!("Settings saved");
            print_json(&settings)
        }
        Command::Cards { owner, state, limit } => {
            let app = App::open(&settings)?;
            let cards = &app.cards;
            let listed = match state {
                CardState::New => cards.new_cards(&owner, limit)?,
                CardState::Learning => cards.learning_cards(&owner, limit)?,
                CardState::Acquired => cards.acquired_cards(&owner, limit)?,
                CardState::Due => cards.due_cards(&owner, Utc::now(), limit)?,
            };
            print_json(&app.service.card_details(listed)?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), HikkiError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_tokenizer(settings: &Settings) -> Result<Arc<dyn hikki::Tokenizer>, HikkiError> {
    let TokenizerBackend::Vibrato(dict_type) = settings.tokenizer;
    let tokenizer: Arc<dyn hikki::Tokenizer> =
        Arc::new(init_vibrato(&dict_type, &settings.model_download)?);
    Ok(tokenizer)
}

fn build_pipeline(settings: &Settings) -> Result<AnnotationPipeline, HikkiError> {
    Ok(AnnotationPipeline::new(build_tokenizer(settings)?).with_parallelism(settings.parallel))
}

struct App {
    service: NotebookService,
    vocabularies: Arc<VocabularyStore>,
    cards: Arc<FlashCardStore>,
}

impl App {
    fn open(settings: &Settings) -> Result<Self, HikkiError> {
        let dictionary_path = settings.term_dictionary.as_ref().ok_or_else(|| {
            HikkiError::Custom(
                "No term dictionary configured, pass --dictionary or set HIKKI_TERM_DICTIONARY"
                    .to_string(),
            )
        })?;

        let tokenizer = build_tokenizer(settings)?;
        let dictionary = Arc::new(load_term_dictionary(dictionary_path)?);
        let vocabularies = Arc::new(VocabularyStore::load(&settings.vocabulary_store_path())?);
        let cards = Arc::new(FlashCardStore::load(&settings.flashcard_store_path())?);

        let pipeline =
            AnnotationPipeline::new(tokenizer.clone()).with_parallelism(settings.parallel);
        let resolver = VocabularyResolver::new(tokenizer, dictionary, vocabularies.clone())
            .with_parallelism(settings.parallel);
        let service = NotebookService::new(pipeline, resolver, cards.clone());

        Ok(App { service, vocabularies, cards })
    }

    fn save(&self, settings: &Settings) -> Result<(), HikkiError> {
        self.vocabularies.save(&settings.vocabulary_store_path())?;
        self.cards.save(&settings.flashcard_store_path())
    }
}
