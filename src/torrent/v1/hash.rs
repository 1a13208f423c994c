use super::*;
use crate::util;
use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, info, warn};
use std::borrow::Cow;
use std::io::{self, Read};
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

/// Default number of hashing worker threads.
pub const DEFAULT_NUM_THREADS: usize = 2;
/// Default number of read pieces that may wait for a worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;
/// Default size of a single read from a file (256 KiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 256 * 1024;

/// Hash `piece` with SHA1, the piece hash used by v1 torrents.
pub fn sha1_piece(piece: &[u8]) -> Piece {
    Sha1::digest(piece).to_vec()
}

/// Splits the content of a [`Manifest`](struct.Manifest.html) into pieces and
/// hashes them.
///
/// The files of the manifest are read one after another, as a single byte
/// stream, by the calling thread. Every `piece_length` bytes of that stream form
/// a piece, no matter where one file ends and the next one starts. The last
/// piece may be shorter.
///
/// Complete pieces are handed to a pool of worker threads through a bounded
/// queue, so at most `queue_capacity` pieces wait in memory and reading stalls
/// while the queue is full. Workers may finish in any order. The returned hashes
/// are always in piece order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PieceHasher {
    piece_length: u64,
    num_threads: usize,
    queue_capacity: usize,
    read_buffer_size: usize,
}

// a complete piece waiting to be hashed
struct PieceJob {
    index: usize,
    bytes: Vec<u8>,
}

// `Err` carries the index of a piece whose worker panicked
type PieceResult = Result<(usize, Piece), usize>;

impl PieceHasher {
    /// Create a new `PieceHasher` with default settings.
    ///
    /// Any positive `piece_length` is accepted here. Range and power-of-2
    /// checks are done by [`TorrentBuilder`](struct.TorrentBuilder.html).
    pub fn new(piece_length: u64) -> PieceHasher {
        PieceHasher {
            piece_length,
            num_threads: DEFAULT_NUM_THREADS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }

    /// Change the number of worker threads.
    ///
    /// If set to 0, the number of threads used will be equal to the number
    /// of physical cores.
    pub fn set_num_threads(self, num_threads: usize) -> PieceHasher {
        PieceHasher {
            num_threads,
            ..self
        }
    }

    /// Change how many read pieces may wait for a worker. At least 1.
    pub fn set_queue_capacity(self, queue_capacity: usize) -> PieceHasher {
        PieceHasher {
            queue_capacity: queue_capacity.max(1),
            ..self
        }
    }

    /// Change the size of a single read. At least 1. It is independent
    /// of the piece length.
    pub fn set_read_buffer_size(self, read_buffer_size: usize) -> PieceHasher {
        PieceHasher {
            read_buffer_size: read_buffer_size.max(1),
            ..self
        }
    }

    /// Hash the pieces of `manifest` with SHA1.
    pub fn hash_pieces(&self, manifest: &Manifest) -> Result<Vec<Piece>, MkTorrentError> {
        self.hash_pieces_with(manifest, sha1_piece)
    }

    /// Hash the pieces of `manifest` with `digest`.
    ///
    /// Returns one hash per piece, `ceil(total length / piece length)` in total,
    /// in stream order. Content with no bytes at all yields no hashes.
    ///
    /// Any read error aborts the whole run, as does a panicking `digest`.
    /// The same happens if a file's size differs from the one in `manifest`.
    pub fn hash_pieces_with<F>(
        &self,
        manifest: &Manifest,
        digest: F,
    ) -> Result<Vec<Piece>, MkTorrentError>
    where
        F: Fn(&[u8]) -> Piece + Sync,
    {
        if self.piece_length == 0 {
            return Err(MkTorrentError::TorrentBuilderFailure(Cow::Borrowed(
                "piece length must be positive.",
            )));
        }

        let piece_length = util::u64_to_usize(self.piece_length)?;
        let piece_count = util::u64_to_usize(manifest.piece_count(self.piece_length))?;
        if piece_count == 0 {
            return Ok(Vec::new());
        }

        let num_threads = if self.num_threads == 0 {
            num_cpus::get_physical()
        } else {
            self.num_threads
        };
        info!(
            "hashing {} piece(s) of {} bytes with {} thread(s)",
            piece_count, piece_length, num_threads
        );

        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("piece-hasher-{}", i))
            .build()
            .map_err(|e| {
                MkTorrentError::Hashing(Cow::Owned(format!(
                    "failed to create rayon thread pool: {}",
                    e
                )))
            })?;

        let (job_tx, job_rx) = channel::bounded::<PieceJob>(self.queue_capacity);
        let (result_tx, result_rx) = channel::unbounded::<PieceResult>();
        let aborted = AtomicBool::new(false);
        let digest = &digest;
        let aborted = &aborted;

        // the calling thread reads and collects, the pool only hashes
        let pieces = thread_pool.in_place_scope(move |scope| {
            for _ in 0..num_threads {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move |_| hash_worker(job_rx, result_tx, digest, aborted));
            }
            drop(job_rx);
            drop(result_tx);

            let read = self.read_manifest(manifest, piece_length, &job_tx, aborted);
            // closing the queue releases the workers once it is drained
            drop(job_tx);

            let read_count = match read {
                Ok(read_count) => read_count,
                Err(e) => {
                    aborted.store(true, Ordering::SeqCst);
                    if let Some(index) = result_rx.try_iter().find_map(|r| r.err()) {
                        return Err(worker_panicked(index));
                    }
                    warn!("hashing aborted: {}", e);
                    return Err(e);
                }
            };
            if read_count != piece_count {
                return Err(MkTorrentError::Hashing(Cow::Owned(format!(
                    "read {} piece(s) but expected {}.",
                    read_count, piece_count
                ))));
            }

            let mut collector = PieceCollector::new(piece_count);
            for result in result_rx.iter() {
                match result {
                    Ok((index, piece)) => collector.insert(index, piece)?,
                    Err(index) => {
                        aborted.store(true, Ordering::SeqCst);
                        return Err(worker_panicked(index));
                    }
                }
            }
            collector.finish()
        })?;

        debug!("hashed {} piece(s)", pieces.len());
        Ok(pieces)
    }

    // Read all entries in order and send every complete piece to `jobs`.
    // Returns the number of pieces sent.
    fn read_manifest(
        &self,
        manifest: &Manifest,
        piece_length: usize,
        jobs: &Sender<PieceJob>,
        aborted: &AtomicBool,
    ) -> Result<usize, MkTorrentError> {
        let mut chunker = PieceChunker::new(piece_length);
        let mut buffer = vec![0; self.read_buffer_size];
        let mut emit = |job: PieceJob| {
            if aborted.load(Ordering::SeqCst) {
                return Err(MkTorrentError::Hashing(Cow::Borrowed(
                    "hashing was aborted.",
                )));
            }
            // blocks while the queue is full
            jobs.send(job).map_err(|_| {
                MkTorrentError::Hashing(Cow::Borrowed("all hashing workers have stopped."))
            })
        };

        for entry in &manifest.entries {
            read_entry(entry, &mut buffer, &mut chunker, &mut emit)?;
        }
        chunker.finish(&mut emit)
    }
}

// Stream one file through `chunker`. The file is closed on return.
fn read_entry<F>(
    entry: &FileEntry,
    buffer: &mut [u8],
    chunker: &mut PieceChunker,
    emit: &mut F,
) -> Result<(), MkTorrentError>
where
    F: FnMut(PieceJob) -> Result<(), MkTorrentError>,
{
    debug!("reading [{}]", entry.path.display());
    let read_error = |offset: u64, source: io::Error| MkTorrentError::Read {
        path: entry.path.clone(),
        offset,
        source,
    };

    let mut file = std::fs::File::open(&entry.path).map_err(|e| read_error(0, e))?;
    let mut offset = 0;
    loop {
        let read = match file.read(buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_error(offset, e)),
        };
        offset += util::usize_to_u64(read)?;
        if offset > entry.length {
            return Err(read_error(
                entry.length,
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    "file grew after the manifest was built",
                ),
            ));
        }
        chunker.feed(&buffer[..read], emit)?;
    }

    if offset < entry.length {
        return Err(read_error(
            offset,
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "file shrank after the manifest was built",
            ),
        ));
    }
    Ok(())
}

fn hash_worker<F>(
    jobs: Receiver<PieceJob>,
    results: Sender<PieceResult>,
    digest: &F,
    aborted: &AtomicBool,
) where
    F: Fn(&[u8]) -> Piece,
{
    for PieceJob { index, bytes } in jobs.iter() {
        // keep draining so the reader never blocks on a dead queue
        if aborted.load(Ordering::SeqCst) {
            continue;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| digest(&bytes)))
            .map(|piece| (index, piece))
            .map_err(|_| index);
        let panicked = result.is_err();
        let sent = results.send(result).is_ok();
        // the failure is reported before anyone is told to stop
        if panicked {
            aborted.store(true, Ordering::SeqCst);
        }
        if !sent {
            break;
        }
    }
}

fn worker_panicked(index: usize) -> MkTorrentError {
    MkTorrentError::Hashing(Cow::Owned(format!(
        "worker panicked while hashing piece #{}.",
        index
    )))
}

// Cuts a byte stream into pieces of a fixed length.
//
// The piece buffer only holds bytes actually fed, so `piece_length` may be far
// larger than the stream.
struct PieceChunker {
    piece_length: usize,
    piece: Vec<u8>,
    next_index: usize,
}

impl PieceChunker {
    fn new(piece_length: usize) -> PieceChunker {
        PieceChunker {
            piece_length,
            piece: Vec::new(),
            next_index: 0,
        }
    }

    // `bytes` may complete any number of pieces
    fn feed<F>(&mut self, mut bytes: &[u8], emit: &mut F) -> Result<(), MkTorrentError>
    where
        F: FnMut(PieceJob) -> Result<(), MkTorrentError>,
    {
        while !bytes.is_empty() {
            let piece_remaining = self.piece_length - self.piece.len();
            if bytes.len() < piece_remaining {
                self.piece.extend_from_slice(bytes);
                break;
            }

            self.piece.extend_from_slice(&bytes[..piece_remaining]);
            bytes = &bytes[piece_remaining..];
            self.emit_piece(emit)?;
        }
        Ok(())
    }

    // Emit the trailing short piece, if any, and return the number of pieces emitted.
    fn finish<F>(mut self, emit: &mut F) -> Result<usize, MkTorrentError>
    where
        F: FnMut(PieceJob) -> Result<(), MkTorrentError>,
    {
        if !self.piece.is_empty() {
            self.emit_piece(emit)?;
        }
        Ok(self.next_index)
    }

    fn emit_piece<F>(&mut self, emit: &mut F) -> Result<(), MkTorrentError>
    where
        F: FnMut(PieceJob) -> Result<(), MkTorrentError>,
    {
        let bytes = mem::take(&mut self.piece);
        let index = self.next_index;
        self.next_index += 1;
        emit(PieceJob { index, bytes })
    }
}

// Reassembles hashes that arrive in any order. Each slot is filled once.
struct PieceCollector {
    slots: Vec<Option<Piece>>,
    received: usize,
}

impl PieceCollector {
    fn new(piece_count: usize) -> PieceCollector {
        PieceCollector {
            slots: vec![None; piece_count],
            received: 0,
        }
    }

    fn insert(&mut self, index: usize, piece: Piece) -> Result<(), MkTorrentError> {
        match self.slots.get_mut(index) {
            Some(Some(_)) => Err(MkTorrentError::Hashing(Cow::Owned(format!(
                "piece #{} was hashed twice.",
                index
            )))),
            Some(slot) => {
                *slot = Some(piece);
                self.received += 1;
                Ok(())
            }
            None => Err(MkTorrentError::Hashing(Cow::Owned(format!(
                "piece #{} is out of range.",
                index
            )))),
        }
    }

    fn finish(self) -> Result<Vec<Piece>, MkTorrentError> {
        if self.received != self.slots.len() {
            return Err(MkTorrentError::Hashing(Cow::Owned(format!(
                "only {} of {} piece(s) were hashed.",
                self.received,
                self.slots.len()
            ))));
        }
        Ok(self.slots.into_iter().flatten().collect())
    }
}
