use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::debug;
use tracker_core::{
	config::{default_data_dir, DATA_DIR_ENV},
	logging,
	tag::validate_tags,
	TagAggregator, TagStore, Tracker, TrackerConfig,
};
use tracker_metadata::{EntityType, MetadataClient};

#[derive(Parser, Debug)]
#[command(name = "tracker", about = "Curate and browse catalog tags")]
struct Args {
	/// Path to tracker data directory
	#[arg(long, global = true, env = DATA_DIR_ENV)]
	data_dir: Option<PathBuf>,

	/// Gateway address as it would arrive in a Host header, `host[:port]`
	#[arg(long, global = true)]
	host: Option<String>,

	/// Namespace the command applies to
	#[arg(long, global = true, default_value = "default")]
	namespace: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	#[command(flatten)]
	Local(LocalCommand),
	#[command(flatten)]
	Remote(RemoteCommand),
}

/// Commands answered from the tag store alone.
#[derive(Subcommand, Debug)]
enum LocalCommand {
	/// Check tag syntax without storing anything
	Validate {
		#[arg(required = true)]
		tags: Vec<String>,
	},
	/// Make tags preferred
	Promote {
		#[arg(required = true)]
		tags: Vec<String>,
	},
	/// Turn preferred tags back into user tags
	Demote {
		#[arg(required = true)]
		tags: Vec<String>,
	},
	/// Remove one preferred tag
	Delete { tag: String },
}

/// Commands that need the metadata service.
#[derive(Subcommand, Debug)]
enum RemoteCommand {
	/// Preferred tags with their entity counts
	Preferred {
		#[arg(long, default_value = "")]
		prefix: String,
	},
	/// User tags with their entity counts
	User {
		#[arg(long, default_value = "")]
		prefix: String,
	},
	/// Preferred and user tags together
	List {
		#[arg(long, default_value = "")]
		prefix: String,
	},
	/// Tags attached to one entity
	Entity { entity_type: EntityType, name: String },
	/// Attach tags to an entity
	Tag {
		entity_type: EntityType,
		name: String,
		#[arg(required = true)]
		tags: Vec<String>,
	},
	/// Detach a tag from an entity
	Untag {
		entity_type: EntityType,
		name: String,
		tag: String,
	},
	/// Entities whose schema has a column, with the column's type
	Columns { column: String },
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	let data_dir = match args.data_dir {
		Some(data_dir) => data_dir,
		None => default_data_dir()?,
	};
	let config = TrackerConfig::load_or_create(&data_dir)?;
	logging::init(&config)?;

	let tracker = Tracker::open(config)?;
	let output = run(&tracker, &args.namespace, args.host.as_deref(), args.command).await?;

	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(())
}

async fn run(tracker: &Tracker, namespace: &str, host: Option<&str>, command: Command) -> Result<Value> {
	debug!(?command, %namespace, "Running command");

	match command {
		Command::Local(command) => run_local(tracker.store(), command),
		Command::Remote(command) => {
			let client = tracker.client(host).await?;
			run_remote(&client, &tracker.aggregator(&client), namespace, command).await
		}
	}
}

fn run_local(store: &TagStore, command: LocalCommand) -> Result<Value> {
	let output = match command {
		LocalCommand::Validate { tags } => serde_json::to_value(validate_tags(&tags))?,
		LocalCommand::Promote { tags } => serde_json::to_value(store.add_preferred_tags(&tags)?)?,
		LocalCommand::Demote { tags } => serde_json::to_value(store.demote_tags(&tags)?)?,
		LocalCommand::Delete { tag } => {
			let deleted = store.delete_tag(&tag)?;
			json!({ "tag": tag, "deleted": deleted })
		}
	};

	Ok(output)
}

async fn run_remote(
	client: &MetadataClient,
	aggregator: &TagAggregator<'_>,
	namespace: &str,
	command: RemoteCommand,
) -> Result<Value> {
	let output = match command {
		RemoteCommand::Preferred { prefix } => {
			serde_json::to_value(aggregator.preferred_tags(&prefix, namespace).await?)?
		}
		RemoteCommand::User { prefix } => {
			serde_json::to_value(aggregator.user_tags(&prefix, namespace).await?)?
		}
		RemoteCommand::List { prefix } => serde_json::to_value(aggregator.tags(&prefix, namespace).await?)?,
		RemoteCommand::Entity { entity_type, name } => {
			serde_json::to_value(aggregator.entity_tags(namespace, entity_type, &name).await?)?
		}
		RemoteCommand::Tag {
			entity_type,
			name,
			tags,
		} => serde_json::to_value(
			aggregator
				.add_entity_tags(namespace, entity_type, &name, &tags)
				.await?,
		)?,
		RemoteCommand::Untag {
			entity_type,
			name,
			tag,
		} => {
			let removed = aggregator
				.remove_entity_tag(namespace, entity_type, &name, &tag)
				.await?;
			json!({ "tag": tag, "removed": removed })
		}
		RemoteCommand::Columns { column } => {
			serde_json::to_value(client.column_records(namespace, &column).await?)?
		}
	};

	Ok(output)
}
