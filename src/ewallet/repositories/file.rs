use super::{check_version, RepositoryError, TransactionRepository, WalletRepository};

use crate::ids::{TransactionId, WalletId};
use crate::models::{LedgerEntry, Transaction, TransactionType, Wallet};
use crate::{CurrencyCode, Money};

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use csv::{ReaderBuilder, WriterBuilder};

use fs4::fs_std::FileExt;

use serde::{Deserialize, Serialize};

use tempfile::NamedTempFile;

type WalletDocument = BTreeMap<WalletId, Wallet>;

/// Wallets kept in a single JSON document keyed by wallet id.
///
/// Saves hold an exclusive lock on a `<document>.lock` file next to the document, so the version
/// check covers every process sharing it. The new document is written to a fresh temporary file
/// and renamed over the old one, so readers never see a half-written document and need no lock.
#[derive(Debug)]
pub struct JsonWalletRepository {
    path: PathBuf,
}

impl JsonWalletRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        return Self { path: path.into() };
    }

    pub fn path(&self) -> &Path {
        return &self.path;
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");

        return PathBuf::from(name);
    }

    fn directory(&self) -> &Path {
        return match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
    }

    fn read_document(&self) -> Result<WalletDocument, RepositoryError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(WalletDocument::new()),
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(WalletDocument::new());
        }

        return Ok(serde_json::from_slice(&bytes)?);
    }

    fn write_document(&self, document: &WalletDocument) -> Result<(), RepositoryError> {
        let mut tmp = NamedTempFile::new_in(self.directory())?;

        serde_json::to_writer_pretty(&mut tmp, document)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        return Ok(());
    }
}

impl WalletRepository for JsonWalletRepository {
    fn find(&self, id: &WalletId) -> Result<Option<Wallet>, RepositoryError> {
        let mut document = self.read_document()?;

        return Ok(document.remove(id));
    }

    fn save(&self, wallet: &Wallet) -> Result<(), RepositoryError> {
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;

        // released when `lock` is dropped
        lock.lock_exclusive()?;

        let mut document = self.read_document()?;

        check_version(document.get(wallet.id()), wallet)?;
        document.insert(wallet.id().clone(), wallet.next_version());

        return self.write_document(&document);
    }
}

/// One row of the ledger file
#[derive(Serialize, Deserialize, Debug)]
struct LedgerRecord {
    id: TransactionId,
    wallet_id: WalletId,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    amount: Money,
    currency: CurrencyCode,
    created_at: DateTime<Utc>,
}

impl LedgerRecord {
    fn new(id: TransactionId, transaction: &Transaction) -> Self {
        return Self {
            id,
            wallet_id: transaction.wallet_id().clone(),
            transaction_type: transaction.transaction_type(),
            amount: transaction.amount(),
            currency: transaction.currency().clone(),
            created_at: transaction.created_at(),
        };
    }

    fn into_entry(self) -> LedgerEntry {
        let transaction = Transaction::at(
            self.wallet_id,
            self.amount,
            self.currency,
            self.transaction_type,
            self.created_at,
        );

        return LedgerEntry::new(self.id, transaction);
    }
}

/// Append-only CSV ledger: `id,wallet_id,type,amount,currency,created_at`.
///
/// Appends take an exclusive lock on the ledger file itself and reads a shared one, so the header
/// is written exactly once and readers never see a partial row. Fields are read back verbatim.
#[derive(Debug)]
pub struct CsvTransactionRepository {
    path: PathBuf,
}

impl CsvTransactionRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        return Self { path: path.into() };
    }

    pub fn path(&self) -> &Path {
        return &self.path;
    }
}

impl TransactionRepository for CsvTransactionRepository {
    fn save(&self, transaction: &Transaction) -> Result<TransactionId, RepositoryError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let is_new = file.metadata()?.len() == 0;
        let mut wtr = WriterBuilder::new().has_headers(is_new).from_writer(&file);

        let id = TransactionId::generate();
        wtr.serialize(LedgerRecord::new(id.clone(), transaction))?;
        wtr.flush()?;

        log::debug!("Appended ledger entry {id} to {:?}", self.path);

        return Ok(id);
    }

    fn find_by_wallet(&self, wallet_id: &WalletId, skip: usize) -> Result<Vec<LedgerEntry>, RepositoryError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        file.lock_shared()?;

        let mut rdr = ReaderBuilder::new().from_reader(&file);

        let mut entries = vec![];
        let mut seen = 0;

        for record in rdr.deserialize::<LedgerRecord>() {
            let record = record?;

            if &record.wallet_id != wallet_id {
                continue;
            }

            seen += 1;
            if seen > skip {
                entries.push(record.into_entry());
            }
        }

        return Ok(entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn usd() -> CurrencyCode {
        CurrencyCode::usd()
    }

    #[test]
    fn wallet_document_round_trip() {
        let dir = TempDir::new().unwrap();
        let repository = JsonWalletRepository::new(dir.path().join("wallets.json"));

        assert_eq!(repository.find(&WalletId::new("w1")).unwrap(), None);

        let mut wallet = Wallet::new(WalletId::new("w1")).with_opening_balance(usd(), Money(1000));
        repository.save(&wallet).unwrap();

        let stored = repository.find(&WalletId::new("w1")).unwrap().unwrap();
        assert_eq!(stored, wallet.next_version());

        wallet = stored;
        wallet.top_up(Money(250), &usd()).unwrap();
        repository.save(&wallet).unwrap();

        let stored = repository.find(&WalletId::new("w1")).unwrap().unwrap();
        assert_eq!(stored.get_balance(&usd()), Money(1250));
        assert_eq!(stored.version(), 2);
        assert!(stored.last_updated().is_some());
    }

    #[test]
    fn wallet_document_conflict() {
        let dir = TempDir::new().unwrap();
        let repository = JsonWalletRepository::new(dir.path().join("wallets.json"));

        let wallet = Wallet::new(WalletId::new("w1"));
        repository.save(&wallet).unwrap();

        let res = repository.save(&wallet);

        assert!(matches!(res, Err(RepositoryError::Conflict { .. })));
    }

    #[test]
    fn wallet_document_stores_decimals_as_strings() {
        let dir = TempDir::new().unwrap();
        let repository = JsonWalletRepository::new(dir.path().join("wallets.json"));

        let wallet = Wallet::new(WalletId::new("w1")).with_opening_balance(usd(), Money(1000));
        repository.save(&wallet).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(repository.path()).unwrap()).unwrap();

        assert_eq!(raw["w1"]["balances"]["USD"], "10.00");
        assert_eq!(raw["w1"]["currency"], "USD");
    }

    #[test]
    fn corrupt_wallet_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallets.json");
        fs::write(&path, "{ not json").unwrap();

        let repository = JsonWalletRepository::new(path);
        let res = repository.find(&WalletId::new("w1"));

        assert!(matches!(res, Err(RepositoryError::Json(_))));
    }

    #[test]
    fn ledger_append_and_read_back() {
        let dir = TempDir::new().unwrap();
        let repository = CsvTransactionRepository::new(dir.path().join("transactions.csv"));

        assert!(repository.find_by_wallet(&WalletId::new("w1"), 0).unwrap().is_empty());

        let first = Transaction::top_up(WalletId::new("w1"), Money(500), usd());
        let other = Transaction::top_up(WalletId::new("w2"), Money(700), usd());
        let second = Transaction::top_up(WalletId::new("w1"), Money(125), CurrencyCode::parse("EUR").unwrap());

        let first_id = repository.save(&first).unwrap();
        repository.save(&other).unwrap();
        let second_id = repository.save(&second).unwrap();

        let entries = repository.find_by_wallet(&WalletId::new("w1"), 0).unwrap();

        assert_eq!(
            entries,
            vec![
                LedgerEntry::new(first_id, first),
                LedgerEntry::new(second_id.clone(), second.clone()),
            ]
        );

        let pending = repository.find_by_wallet(&WalletId::new("w1"), 1).unwrap();
        assert_eq!(pending, vec![LedgerEntry::new(second_id, second)]);
    }

    #[test]
    fn ledger_file_layout() {
        let dir = TempDir::new().unwrap();
        let repository = CsvTransactionRepository::new(dir.path().join("transactions.csv"));

        repository
            .save(&Transaction::top_up(WalletId::new("w1"), Money(500), usd()))
            .unwrap();
        repository
            .save(&Transaction::top_up(WalletId::new("w1"), Money(100), usd()))
            .unwrap();

        let contents = fs::read_to_string(repository.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "id,wallet_id,type,amount,currency,created_at");
        assert!(lines[1].contains(",w1,TOP_UP,5.00,USD,"));
        assert!(lines[2].contains(",w1,TOP_UP,1.00,USD,"));
    }

    #[test]
    fn ledger_keeps_wallet_ids_verbatim() {
        let dir = TempDir::new().unwrap();
        let repository = CsvTransactionRepository::new(dir.path().join("transactions.csv"));

        let wallet_ids = [" w1", "w1 ", "a,b", "q\"t", "w1"];

        for (i, wallet_id) in wallet_ids.iter().enumerate() {
            repository
                .save(&Transaction::top_up(WalletId::new(*wallet_id), Money(100 + i as u64), usd()))
                .unwrap();
        }

        for (i, wallet_id) in wallet_ids.iter().enumerate() {
            let entries = repository.find_by_wallet(&WalletId::new(*wallet_id), 0).unwrap();

            assert_eq!(entries.len(), 1, "entries for {wallet_id:?}");
            assert_eq!(entries[0].wallet_id(), &WalletId::new(*wallet_id));
            assert_eq!(entries[0].amount(), Money(100 + i as u64));
        }
    }

    #[test]
    fn wallet_document_shared_between_stores() {
        let dir = TempDir::new().unwrap();
        let first = JsonWalletRepository::new(dir.path().join("wallets.json"));
        let second = JsonWalletRepository::new(dir.path().join("wallets.json"));

        let wallet = Wallet::new(WalletId::new("w1"));
        first.save(&wallet).unwrap();

        let res = second.save(&wallet);

        assert!(matches!(
            res,
            Err(RepositoryError::Conflict {
                expected: 0,
                found: Some(1),
                ..
            })
        ));
        assert_eq!(second.find(&WalletId::new("w1")).unwrap(), Some(wallet.next_version()));

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .filter(|name| name != "wallets.json" && name != "wallets.json.lock")
            .collect();
        assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
    }

    #[test]
    fn ledger_shared_between_writers() {
        const WRITERS: usize = 8;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.csv");

        let handles: Vec<_> = (0..WRITERS)
            .map(|_| {
                let repository = CsvTransactionRepository::new(path.clone());

                std::thread::spawn(move || {
                    repository
                        .save(&Transaction::top_up(WalletId::new("w1"), Money(100), CurrencyCode::usd()))
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        let headers = contents.lines().filter(|line| line.starts_with("id,")).count();
        assert_eq!(headers, 1);

        let repository = CsvTransactionRepository::new(path);
        assert_eq!(repository.find_by_wallet(&WalletId::new("w1"), 0).unwrap().len(), WRITERS);
    }
}
