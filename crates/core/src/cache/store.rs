//! Store and entry operations.
//!
//! Storage-wide operations (open, enumerate, delete by name, lookup across
//! stores) live on [`CacheStorage`]; per-store operations (insert, lookup,
//! enumerate keys, delete by key) live on [`CacheStore`].

use super::connection::CacheStorage;
use super::hash::compute_cache_key;
use crate::Error;
use crate::http::{Destination, Headers, Request, RequestMode, Response};
use tokio_rusqlite::rusqlite;
use tokio_rusqlite::{Connection, params};
use url::Url;

/// Handle to one named store.
///
/// Entries are kept in insertion order. Writing a key that is already
/// present replaces the entry and moves it to the newest position.
#[derive(Clone, Debug)]
pub struct CacheStore {
    id: i64,
    name: String,
    conn: Connection,
}

/// An entry ready to be written, with its body already taken out of the
/// response.
#[derive(Debug)]
struct NewEntry {
    key_hash: String,
    method: String,
    url: String,
    mode: String,
    destination: String,
    request_headers_json: String,
    status: u16,
    response_headers_json: String,
    response_url: Option<String>,
    body: Vec<u8>,
}

impl NewEntry {
    fn new(request: &Request, response: Response) -> Result<Self, Error> {
        if !request.is_get() {
            return Err(Error::InvalidInput(format!(
                "only GET requests can be cached, got {}",
                request.method()
            )));
        }

        let mut url = request.url().clone();
        url.set_fragment(None);

        let (status, headers, response_url, body) = response.into_parts();
        let request_headers_json =
            serde_json::to_string(request.headers()).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let response_headers_json =
            serde_json::to_string(&headers).map_err(|e| Error::InvalidInput(e.to_string()))?;

        Ok(Self {
            key_hash: compute_cache_key(request.method(), &url),
            method: request.method().to_string(),
            url: url.to_string(),
            mode: request.mode().as_str().to_string(),
            destination: request.destination().as_str().to_string(),
            request_headers_json,
            status,
            response_headers_json,
            response_url: response_url.map(|u| u.to_string()),
            body: body.to_vec(),
        })
    }
}

/// Raw response columns as read from the database.
struct StoredResponse {
    status: u16,
    headers_json: String,
    url: Option<String>,
    body: Vec<u8>,
}

impl StoredResponse {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self { status: row.get(0)?, headers_json: row.get(1)?, url: row.get(2)?, body: row.get(3)? })
    }

    fn into_response(self) -> Result<Response, Error> {
        let headers: Headers = serde_json::from_str(&self.headers_json).map_err(|e| Error::Corrupt(e.to_string()))?;
        let mut response = Response::new(self.status, headers, self.body);
        if let Some(url) = self.url {
            response = response.with_url(Url::parse(&url).map_err(|e| Error::Corrupt(e.to_string()))?);
        }
        Ok(response)
    }
}

/// Raw request columns as read from the database.
struct StoredRequest {
    method: String,
    url: String,
    mode: String,
    destination: String,
    headers_json: String,
}

impl StoredRequest {
    fn into_request(self) -> Result<Request, Error> {
        let url = Url::parse(&self.url).map_err(|e| Error::Corrupt(e.to_string()))?;
        let headers: Headers = serde_json::from_str(&self.headers_json).map_err(|e| Error::Corrupt(e.to_string()))?;
        let mode = self
            .mode
            .parse::<RequestMode>()
            .map_err(|e| Error::Corrupt(e.to_string()))?;
        let destination = self
            .destination
            .parse::<Destination>()
            .map_err(|e| Error::Corrupt(e.to_string()))?;

        Ok(Request::new(&self.method, url)
            .with_headers(headers)
            .with_mode(mode)
            .with_destination(destination))
    }
}

fn insert_entry(conn: &rusqlite::Connection, store_id: i64, entry: &NewEntry) -> Result<(), Error> {
    conn.execute(
        "DELETE FROM entries WHERE store_id = ?1 AND key_hash = ?2",
        params![store_id, &entry.key_hash],
    )?;
    conn.execute(
        "INSERT INTO entries (
            store_id, key_hash, method, url, mode, destination, request_headers_json,
            status, response_headers_json, response_url, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            store_id,
            &entry.key_hash,
            &entry.method,
            &entry.url,
            &entry.mode,
            &entry.destination,
            &entry.request_headers_json,
            entry.status,
            &entry.response_headers_json,
            &entry.response_url,
            &entry.body,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

impl CacheStorage {
    /// Open the named store, creating it if it doesn't exist.
    pub async fn open_store(&self, name: &str) -> Result<CacheStore, Error> {
        let name = name.to_string();
        let lookup = name.clone();
        let id = self
            .conn
            .call(move |conn| -> Result<i64, Error> {
                conn.execute(
                    "INSERT INTO stores (name, created_at) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
                    params![lookup, chrono::Utc::now().to_rfc3339()],
                )?;
                let id = conn.query_row("SELECT id FROM stores WHERE name = ?1", params![lookup], |row| row.get(0))?;
                Ok(id)
            })
            .await
            .map_err(Error::from)?;

        Ok(CacheStore { id, name, conn: self.conn.clone() })
    }

    /// Get a handle to an existing store without creating it.
    pub async fn existing_store(&self, name: &str) -> Result<Option<CacheStore>, Error> {
        let lookup = name.to_string();
        let id = self
            .conn
            .call(move |conn| -> Result<Option<i64>, Error> {
                let result = conn.query_row("SELECT id FROM stores WHERE name = ?1", params![lookup], |row| row.get(0));
                match result {
                    Ok(id) => Ok(Some(id)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        Ok(id.map(|id| CacheStore { id, name: name.to_string(), conn: self.conn.clone() }))
    }

    /// Whether a store with this name exists.
    pub async fn has_store(&self, name: &str) -> Result<bool, Error> {
        Ok(self.existing_store(name).await?.is_some())
    }

    /// Names of every store, in creation order.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM stores ORDER BY id ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and all of its entries.
    ///
    /// Returns false if no store had that name.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM stores WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Look a request up in every store, oldest store first.
    ///
    /// Returns None on a miss and for non-GET requests.
    pub async fn match_request(&self, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_get() {
            return Ok(None);
        }
        let key_hash = compute_cache_key(request.method(), request.url());
        let stored = self
            .conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT e.status, e.response_headers_json, e.response_url, e.body
                     FROM entries e JOIN stores s ON s.id = e.store_id
                     WHERE e.key_hash = ?1
                     ORDER BY s.id ASC
                     LIMIT 1",
                )?;
                let result = stmt.query_row(params![key_hash], StoredResponse::from_row);
                match result {
                    Ok(s) => Ok(Some(s)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        stored.map(StoredResponse::into_response).transpose()
    }
}

impl CacheStore {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or replace the entry for `request`.
    pub async fn put(&self, request: &Request, response: Response) -> Result<(), Error> {
        self.put_all(vec![(request.clone(), response)]).await
    }

    /// Insert several entries in one transaction.
    ///
    /// Either every entry is written or none is.
    pub async fn put_all(&self, entries: Vec<(Request, Response)>) -> Result<(), Error> {
        let entries = entries
            .into_iter()
            .map(|(request, response)| NewEntry::new(&request, response))
            .collect::<Result<Vec<_>, _>>()?;
        let store_id = self.id;

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for entry in &entries {
                    insert_entry(&tx, store_id, entry)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look a request up in this store only.
    pub async fn match_request(&self, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_get() {
            return Ok(None);
        }
        let key_hash = compute_cache_key(request.method(), request.url());
        let store_id = self.id;
        let stored = self
            .conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT status, response_headers_json, response_url, body
                     FROM entries WHERE store_id = ?1 AND key_hash = ?2",
                )?;
                let result = stmt.query_row(params![store_id, key_hash], StoredResponse::from_row);
                match result {
                    Ok(s) => Ok(Some(s)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        stored.map(StoredResponse::into_response).transpose()
    }

    /// Every stored request, oldest insertion first.
    pub async fn keys(&self) -> Result<Vec<Request>, Error> {
        let store_id = self.id;
        let stored = self
            .conn
            .call(move |conn| -> Result<Vec<StoredRequest>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url, mode, destination, request_headers_json
                     FROM entries WHERE store_id = ?1 ORDER BY seq ASC",
                )?;
                let rows = stmt
                    .query_map(params![store_id], |row| {
                        Ok(StoredRequest {
                            method: row.get(0)?,
                            url: row.get(1)?,
                            mode: row.get(2)?,
                            destination: row.get(3)?,
                            headers_json: row.get(4)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        stored.into_iter().map(StoredRequest::into_request).collect()
    }

    /// Delete the entry for `request`.
    ///
    /// Returns false if there was none.
    pub async fn delete(&self, request: &Request) -> Result<bool, Error> {
        let key_hash = compute_cache_key(request.method(), request.url());
        let store_id = self.id;
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM entries WHERE store_id = ?1 AND key_hash = ?2",
                    params![store_id, key_hash],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in the store.
    pub async fn len(&self) -> Result<usize, Error> {
        let store_id = self.id;
        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE store_id = ?1", params![store_id], |row| {
                        row.get(0)
                    })?;
                Ok(count as usize)
            })
            .await
            .map_err(Error::from)
    }
}
