//! In-memory stand-in for a Redis connection, for unit tests that shouldn't need a server.
//!
//! Supports only the commands this crate sends. Every command run is recorded, so tests can check
//! both the resulting data and the sequence of commands that produced it.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use redis::{aio::ConnectionLike, Arg, Cmd, ErrorKind, Pipeline, RedisFuture, RedisResult, Value};

#[derive(Debug)]
enum Entry {
    Str(Vec<u8>),
    List(VecDeque<Vec<u8>>),
    Set(BTreeSet<Vec<u8>>),
}

#[derive(Debug, Default)]
pub struct MemoryConnection {
    data: BTreeMap<Vec<u8>, Entry>,

    /// Name of every command run, in order, including `MULTI`/`EXEC` around transactions.
    pub commands: Vec<String>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether given key currently holds a value.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key.as_bytes())
    }

    /// Sorted list of all keys currently holding a value.
    pub fn keys(&self) -> Vec<String> {
        self.data
            .keys()
            .map(|k| String::from_utf8_lossy(k).into_owned())
            .collect()
    }

    fn run(&mut self, cmd: &Cmd) -> RedisResult<Value> {
        let mut args: Vec<Vec<u8>> = cmd
            .args_iter()
            .map(|arg| match arg {
                Arg::Simple(bytes) => bytes.to_vec(),
                Arg::Cursor => b"0".to_vec(),
            })
            .collect();
        if args.is_empty() {
            return Err((ErrorKind::ClientError, "empty command").into());
        }
        let name = String::from_utf8_lossy(&args.remove(0)).to_uppercase();
        self.commands.push(name.clone());

        match name.as_str() {
            "PING" => Ok(Value::Status("PONG".to_owned())),
            "GET" => Ok(match self.data.get(&args[0]) {
                Some(Entry::Str(value)) => Value::Data(value.clone()),
                Some(_) => return Err(wrong_type()),
                None => Value::Nil,
            }),
            "MGET" => Ok(Value::Bulk(
                args.iter()
                    .map(|key| match self.data.get(key) {
                        Some(Entry::Str(value)) => Value::Data(value.clone()),
                        _ => Value::Nil,
                    })
                    .collect(),
            )),
            "SET" => {
                self.data.insert(args[0].clone(), Entry::Str(args[1].clone()));
                Ok(Value::Okay)
            }
            "INCRBY" => {
                let current = match self.data.get(&args[0]) {
                    Some(Entry::Str(value)) => parse_int(value)?,
                    Some(_) => return Err(wrong_type()),
                    None => 0,
                };
                let next = current + parse_int(&args[1])?;
                self.data.insert(args[0].clone(), Entry::Str(next.to_string().into_bytes()));
                Ok(Value::Int(next))
            }
            "DEL" => Ok(Value::Int(
                args.iter().filter(|key| self.data.remove(*key).is_some()).count() as i64,
            )),
            "EXISTS" => Ok(Value::Int(
                args.iter().filter(|key| self.data.contains_key(*key)).count() as i64,
            )),
            "SADD" => {
                let set = self.set_mut(&args[0])?;
                Ok(Value::Int(args[1..].iter().filter(|m| set.insert((*m).clone())).count() as i64))
            }
            "SREM" => {
                let removed = match self.data.get_mut(&args[0]) {
                    Some(Entry::Set(set)) => args[1..].iter().filter(|m| set.remove(*m)).count(),
                    Some(_) => return Err(wrong_type()),
                    None => 0,
                };
                self.drop_if_empty(&args[0]);
                Ok(Value::Int(removed as i64))
            }
            "SMEMBERS" => Ok(Value::Bulk(match self.data.get(&args[0]) {
                Some(Entry::Set(set)) => set.iter().cloned().map(Value::Data).collect(),
                Some(_) => return Err(wrong_type()),
                None => Vec::new(),
            })),
            "SISMEMBER" => Ok(Value::Int(match self.data.get(&args[0]) {
                Some(Entry::Set(set)) => set.contains(&args[1]) as i64,
                Some(_) => return Err(wrong_type()),
                None => 0,
            })),
            "RPUSH" => {
                let list = self.list_mut(&args[0])?;
                list.extend(args[1..].iter().cloned());
                Ok(Value::Int(list.len() as i64))
            }
            "LPOP" => {
                let popped = match self.data.get_mut(&args[0]) {
                    Some(Entry::List(list)) => list.pop_front(),
                    Some(_) => return Err(wrong_type()),
                    None => None,
                };
                self.drop_if_empty(&args[0]);
                Ok(popped.map_or(Value::Nil, Value::Data))
            }
            "LLEN" => Ok(Value::Int(match self.data.get(&args[0]) {
                Some(Entry::List(list)) => list.len() as i64,
                Some(_) => return Err(wrong_type()),
                None => 0,
            })),
            "LRANGE" => {
                let list = match self.data.get(&args[0]) {
                    Some(Entry::List(list)) => list,
                    Some(_) => return Err(wrong_type()),
                    None => return Ok(Value::Bulk(Vec::new())),
                };
                let len = list.len() as i64;
                let resolve = |i: i64| if i < 0 { len + i } else { i };
                let start = resolve(parse_int(&args[1])?).max(0);
                let stop = resolve(parse_int(&args[2])?).min(len - 1);
                Ok(Value::Bulk(if start > stop {
                    Vec::new()
                } else {
                    list.iter()
                        .skip(start as usize)
                        .take((stop - start + 1) as usize)
                        .cloned()
                        .map(Value::Data)
                        .collect()
                }))
            }
            _ => Err((ErrorKind::ClientError, "unsupported command", name).into()),
        }
    }

    fn set_mut(&mut self, key: &[u8]) -> RedisResult<&mut BTreeSet<Vec<u8>>> {
        match self
            .data
            .entry(key.to_vec())
            .or_insert_with(|| Entry::Set(BTreeSet::new()))
        {
            Entry::Set(set) => Ok(set),
            _ => Err(wrong_type()),
        }
    }

    fn list_mut(&mut self, key: &[u8]) -> RedisResult<&mut VecDeque<Vec<u8>>> {
        match self
            .data
            .entry(key.to_vec())
            .or_insert_with(|| Entry::List(VecDeque::new()))
        {
            Entry::List(list) => Ok(list),
            _ => Err(wrong_type()),
        }
    }

    fn drop_if_empty(&mut self, key: &[u8]) {
        let empty = match self.data.get(key) {
            Some(Entry::List(list)) => list.is_empty(),
            Some(Entry::Set(set)) => set.is_empty(),
            _ => false,
        };
        if empty {
            self.data.remove(key);
        }
    }

    fn run_pipeline(
        &mut self,
        pipeline: &Pipeline,
        offset: usize,
        count: usize,
    ) -> RedisResult<Vec<Value>> {
        let commands: Vec<&Cmd> = pipeline.cmd_iter().collect();

        // an atomic pipeline asks for the single reply to EXEC, after MULTI and one QUEUED per command
        if count == 1 && offset == commands.len() + 1 {
            self.commands.push("MULTI".to_owned());
            let mut results = Vec::with_capacity(commands.len());
            for cmd in commands {
                results.push(self.run(cmd)?);
            }
            self.commands.push("EXEC".to_owned());
            return Ok(vec![Value::Bulk(results)]);
        }

        let mut results = Vec::with_capacity(commands.len());
        for cmd in commands {
            results.push(self.run(cmd)?);
        }
        Ok(results.into_iter().skip(offset).take(count).collect())
    }
}

impl ConnectionLike for MemoryConnection {
    fn req_packed_command<'a>(&'a mut self, cmd: &'a Cmd) -> RedisFuture<'a, Value> {
        let result = self.run(cmd);
        Box::pin(async move { result })
    }

    fn req_packed_commands<'a>(
        &'a mut self,
        cmd: &'a Pipeline,
        offset: usize,
        count: usize,
    ) -> RedisFuture<'a, Vec<Value>> {
        let result = self.run_pipeline(cmd, offset, count);
        Box::pin(async move { result })
    }

    fn get_db(&self) -> i64 {
        0
    }
}

fn parse_int(value: &[u8]) -> RedisResult<i64> {
    std::str::from_utf8(value)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| (ErrorKind::TypeError, "value is not an integer").into())
}

fn wrong_type() -> redis::RedisError {
    (ErrorKind::TypeError, "WRONGTYPE Operation against a key holding the wrong kind of value").into()
}
