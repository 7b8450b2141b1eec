#![allow(dead_code)]

use std::{
	collections::{BTreeMap, BTreeSet, HashMap},
	net::{SocketAddr, TcpListener},
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc, Mutex, PoisonError,
	},
};

use async_trait::async_trait;
use axum::{
	extract::{Path, Query, State},
	http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode, Uri},
	routing::{delete, get},
	Json, Router,
};
use serde_json::{json, Value};
use tracker_discovery::{Connector, Coordinator, Discoverable};
use tracker_metadata::{EntityId, EntityType};

#[derive(Debug, Clone)]
pub struct Recorded {
	pub method: Method,
	pub path: String,
	pub query: Vec<(String, String)>,
	pub authorization: Option<String>,
	pub body: Option<Value>,
}

#[derive(Debug, Default, Clone)]
pub struct FakeEntity {
	pub tags: BTreeSet<String>,
	pub properties: HashMap<String, String>,
}

/// Stands in for both the gateway and a metadata service instance.
pub struct FakeMetadataService {
	ping_status: StatusCode,
	duplicate_hits: bool,
	entities: Mutex<BTreeMap<EntityId, FakeEntity>>,
	requests: Mutex<Vec<Recorded>>,
}

impl FakeMetadataService {
	pub fn new(ping_status: StatusCode) -> Arc<Self> {
		Self::build(ping_status, false)
	}

	/// Search hits are reported twice, like a search spanning several scopes.
	pub fn with_duplicate_hits(ping_status: StatusCode) -> Arc<Self> {
		Self::build(ping_status, true)
	}

	fn build(ping_status: StatusCode, duplicate_hits: bool) -> Arc<Self> {
		Arc::new(Self {
			ping_status,
			duplicate_hits,
			entities: Mutex::default(),
			requests: Mutex::default(),
		})
	}

	pub fn insert(&self, id: EntityId, tags: &[&str]) {
		self.entities
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.entry(id)
			.or_default()
			.tags
			.extend(tags.iter().map(|t| t.to_string()));
	}

	pub fn set_property(&self, id: &EntityId, key: &str, value: &str) {
		self.entities
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.entry(id.clone())
			.or_default()
			.properties
			.insert(key.to_string(), value.to_string());
	}

	pub fn tags_of(&self, id: &EntityId) -> BTreeSet<String> {
		self.entities
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.get(id)
			.map(|e| e.tags.clone())
			.unwrap_or_default()
	}

	pub fn requests(&self) -> Vec<Recorded> {
		self.requests
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	fn record(
		&self,
		method: Method,
		path: String,
		query: Vec<(String, String)>,
		headers: &HeaderMap,
		body: Option<Value>,
	) {
		self.requests
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(Recorded {
				method,
				path,
				query,
				authorization: headers
					.get(AUTHORIZATION)
					.and_then(|v| v.to_str().ok())
					.map(str::to_string),
				body,
			});
	}

	fn matches(entity: &FakeEntity, query: &str) -> bool {
		query == "*"
			|| entity.tags.contains(query)
			|| entity.properties.values().any(|v| v.contains(query))
	}
}

type Shared = State<Arc<FakeMetadataService>>;

fn entity_id<const STREAM: bool>(namespace: String, name: String) -> EntityId {
	let entity_type = if STREAM {
		EntityType::Stream
	} else {
		EntityType::Dataset
	};
	EntityId::new(namespace, entity_type, name)
}

async fn ping(State(service): Shared, headers: HeaderMap) -> StatusCode {
	service.record(Method::GET, "/ping".to_string(), vec![], &headers, None);
	service.ping_status
}

/// Namespaces whose search fails with a fixed status and body.
pub const FAILING_NAMESPACES: [(&str, StatusCode, &str); 5] = [
	("invalid", StatusCode::BAD_REQUEST, "query is malformed"),
	("locked", StatusCode::UNAUTHORIZED, "token expired"),
	("forbidden", StatusCode::FORBIDDEN, "no access to namespace 'forbidden'"),
	("missing", StatusCode::NOT_FOUND, "namespace 'missing' not found"),
	("broken", StatusCode::INTERNAL_SERVER_ERROR, "index is rebuilding"),
];

async fn search(
	State(service): Shared,
	Path(namespace): Path<String>,
	Query(query): Query<Vec<(String, String)>>,
	uri: Uri,
	headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, String)> {
	service.record(Method::GET, uri.path().to_string(), query.clone(), &headers, None);

	if let Some((_, status, body)) = FAILING_NAMESPACES.iter().find(|(ns, ..)| *ns == namespace) {
		return Err((*status, body.to_string()));
	}

	let Some((_, text)) = query.iter().find(|(k, _)| k == "query") else {
		return Err((StatusCode::BAD_REQUEST, "query is required".to_string()));
	};

	let repeat = if service.duplicate_hits { 2 } else { 1 };
	let results = service
		.entities
		.lock()
		.unwrap_or_else(PoisonError::into_inner)
		.iter()
		.filter(|(id, entity)| id.namespace == namespace && FakeMetadataService::matches(entity, text))
		.flat_map(|(id, _)| std::iter::repeat(json!({ "entityId": id, "metadata": {} })).take(repeat))
		.collect::<Vec<_>>();

	Ok(Json(json!({ "total": results.len(), "results": results })))
}

async fn entity_tags<const STREAM: bool>(
	State(service): Shared,
	Path((namespace, name)): Path<(String, String)>,
	uri: Uri,
	Query(query): Query<Vec<(String, String)>>,
	headers: HeaderMap,
) -> Result<Json<BTreeSet<String>>, StatusCode> {
	let id = entity_id::<STREAM>(namespace, name);
	service.record(
		Method::GET,
		uri.path().to_string(),
		query,
		&headers,
		None,
	);

	service
		.entities
		.lock()
		.unwrap_or_else(PoisonError::into_inner)
		.get(&id)
		.map(|e| Json(e.tags.clone()))
		.ok_or(StatusCode::NOT_FOUND)
}

async fn add_tags<const STREAM: bool>(
	State(service): Shared,
	Path((namespace, name)): Path<(String, String)>,
	uri: Uri,
	headers: HeaderMap,
	Json(tags): Json<Vec<String>>,
) -> StatusCode {
	let id = entity_id::<STREAM>(namespace, name);
	service.record(
		Method::POST,
		uri.path().to_string(),
		vec![],
		&headers,
		Some(json!(tags)),
	);

	match service
		.entities
		.lock()
		.unwrap_or_else(PoisonError::into_inner)
		.get_mut(&id)
	{
		Some(entity) => {
			entity.tags.extend(tags);
			StatusCode::OK
		}
		None => StatusCode::NOT_FOUND,
	}
}

async fn remove_tag<const STREAM: bool>(
	State(service): Shared,
	Path((namespace, name, tag)): Path<(String, String, String)>,
	uri: Uri,
	headers: HeaderMap,
) -> StatusCode {
	let id = entity_id::<STREAM>(namespace, name);
	service.record(
		Method::DELETE,
		uri.path().to_string(),
		vec![],
		&headers,
		None,
	);

	match service
		.entities
		.lock()
		.unwrap_or_else(PoisonError::into_inner)
		.get_mut(&id)
		.map(|entity| entity.tags.remove(&tag))
	{
		Some(true) => StatusCode::OK,
		_ => StatusCode::NOT_FOUND,
	}
}

async fn properties<const STREAM: bool>(
	State(service): Shared,
	Path((namespace, name)): Path<(String, String)>,
	uri: Uri,
	headers: HeaderMap,
) -> Result<Json<HashMap<String, String>>, StatusCode> {
	let id = entity_id::<STREAM>(namespace, name);
	service.record(
		Method::GET,
		uri.path().to_string(),
		vec![],
		&headers,
		None,
	);

	service
		.entities
		.lock()
		.unwrap_or_else(PoisonError::into_inner)
		.get(&id)
		.map(|e| Json(e.properties.clone()))
		.ok_or(StatusCode::NOT_FOUND)
}

fn entity_routes<const STREAM: bool>(router: Router<Arc<FakeMetadataService>>) -> Router<Arc<FakeMetadataService>> {
	let collection = if STREAM { "streams" } else { "datasets" };

	router
		.route(
			&format!("/v3/namespaces/:namespace/{collection}/:name/metadata/tags"),
			get(entity_tags::<STREAM>).post(add_tags::<STREAM>),
		)
		.route(
			&format!("/v3/namespaces/:namespace/{collection}/:name/metadata/tags/:tag"),
			delete(remove_tag::<STREAM>),
		)
		.route(
			&format!("/v3/namespaces/:namespace/{collection}/:name/metadata/properties"),
			get(properties::<STREAM>),
		)
}

/// Serves `service` on an ephemeral local port.
pub fn serve(service: Arc<FakeMetadataService>) -> SocketAddr {
	let router = Router::new()
		.route("/ping", get(ping))
		.route("/v3/namespaces/:namespace/metadata/search", get(search));
	let router = entity_routes::<true>(entity_routes::<false>(router)).with_state(service);

	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	listener.set_nonblocking(true).unwrap();
	let addr = listener.local_addr().unwrap();

	tokio::spawn(async move {
		axum::Server::from_tcp(listener)
			.unwrap()
			.serve(router.into_make_service())
			.await
			.unwrap();
	});

	addr
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	listener.local_addr().unwrap().port()
}

/// Coordinator holding a fixed set of metadata service registrations.
#[derive(Default)]
pub struct StaticCoordinator {
	instances: Vec<Discoverable>,
}

impl StaticCoordinator {
	pub fn with_instance(addr: SocketAddr) -> Self {
		Self {
			instances: vec![Discoverable {
				service: tracker_metadata::DEFAULT_METADATA_SERVICE.to_string(),
				hostname: addr.ip().to_string(),
				port: addr.port(),
			}],
		}
	}
}

#[async_trait]
impl Coordinator for StaticCoordinator {
	async fn children(&self, path: &str) -> tracker_discovery::Result<Vec<String>> {
		if path != format!("/discoverable/{}", tracker_metadata::DEFAULT_METADATA_SERVICE) {
			return Ok(vec![]);
		}
		Ok((0..self.instances.len()).map(|i| format!("{i:010}")).collect())
	}

	async fn data(&self, path: &str) -> tracker_discovery::Result<Option<Vec<u8>>> {
		let index = path
			.rsplit('/')
			.next()
			.and_then(|child| child.parse::<usize>().ok());

		Ok(index
			.and_then(|i| self.instances.get(i))
			.map(|d| serde_json::to_vec(d).unwrap()))
	}
}

/// Hands out the same coordinator and counts how often it was asked to connect.
pub struct CountingConnector {
	coordinator: Arc<StaticCoordinator>,
	pub connections: AtomicUsize,
}

impl CountingConnector {
	pub fn new(coordinator: StaticCoordinator) -> Arc<Self> {
		Arc::new(Self {
			coordinator: Arc::new(coordinator),
			connections: AtomicUsize::new(0),
		})
	}

	pub fn connections(&self) -> usize {
		self.connections.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl Connector for CountingConnector {
	async fn connect(&self, _quorum: &str) -> tracker_discovery::Result<Arc<dyn Coordinator>> {
		self.connections.fetch_add(1, Ordering::SeqCst);
		// Widen the window in which concurrent callers race for construction.
		tokio::task::yield_now().await;
		Ok(Arc::clone(&self.coordinator) as Arc<dyn Coordinator>)
	}
}
