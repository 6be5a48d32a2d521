// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::io::ErrorKind;

use crate::attestation::{AttestationVerifier, Certificate};
use crate::config::ApiKeySource;
use crate::context::{Event, StateContext};
use crate::enclave::EnclaveGateway;
use crate::error::{AuthenticateError, SeedInitError};
use crate::seed;
use crate::storage::{
    JsonRecordCodec, MasterCertificateKind, NodePaths, RecordCodec, RegistrationRecord,
    RegistrationStore, StoreResult,
};

/// Returned instead of a sealed seed when a registration is only simulated.
pub const SIMULATION_SEED: [u8; 32] = [0u8; 32];

pub const NODE_REGISTERED_EVENT: &str = "node_registered";

/// Load this node's provisioned seed into its enclave.
///
/// Reads `<home>/.node/seed.json`, accepts either seed schema, re-encodes the
/// sealed seed with its length prefix and passes it to the enclave together
/// with the master public key.
pub fn initialize_node<V, E>(
    paths: &NodePaths,
    verifier: &V,
    enclave: &E,
    api_key: &[u8],
) -> Result<(), SeedInitError>
where
    V: AttestationVerifier + ?Sized,
    E: EnclaveGateway + ?Sized,
{
    let seed_path = paths.seed_config();
    let raw = match std::fs::read(&seed_path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SeedInitError::NotFound { path: seed_path })
        }
        Err(e) => return Err(e.into()),
    };

    let mut config = seed::decode(&raw, verifier)?;

    let prefixed = seed::encode_length_prefixed(&config.encrypted_key_bytes()?);
    config.encrypted_key = hex::encode(&prefixed);
    seed::validate(&config)?;

    enclave.load_seed(&config.master_key, &prefixed, api_key)?;

    tracing::info!(
        master_key = %hex::encode(&config.master_key),
        sealed_len = prefixed.len() - 1,
        "Network seed loaded into enclave"
    );
    Ok(())
}

/// Attestation-gated seed provisioning backed by the ledger.
pub struct RegistrationService<V, E, C = JsonRecordCodec> {
    verifier: V,
    enclave: E,
    store: RegistrationStore<C>,
}

impl<V: AttestationVerifier, E: EnclaveGateway> RegistrationService<V, E> {
    /// Construct the service, initializing the node unless it is the
    /// bootstrap (genesis) node.
    ///
    /// The API key is resolved before the seed file is read.
    pub fn new(
        paths: &NodePaths,
        verifier: V,
        enclave: E,
        bootstrap: bool,
        api_key: &ApiKeySource,
    ) -> Result<Self, SeedInitError> {
        if bootstrap {
            tracing::info!("Bootstrap node, skipping seed initialization");
        } else {
            let key = api_key
                .load()
                .map_err(|e| SeedInitError::ApiKey(e.to_string()))?;
            initialize_node(paths, &verifier, &enclave, &key)?;
        }

        Ok(Self::with_store(verifier, enclave, RegistrationStore::default()))
    }
}

impl<V: AttestationVerifier, E: EnclaveGateway, C: RecordCodec> RegistrationService<V, E, C> {
    /// Construct the service without touching the node's seed.
    pub fn with_store(verifier: V, enclave: E, store: RegistrationStore<C>) -> Self {
        Self {
            verifier,
            enclave,
            store,
        }
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    pub fn enclave(&self) -> &E {
        &self.enclave
    }

    pub(crate) fn store(&self) -> &RegistrationStore<C> {
        &self.store
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Authenticate a node and return the network seed sealed for it.
    ///
    /// A key that is already registered gets its stored seed back without
    /// another enclave call. Simulation runs get [`SIMULATION_SEED`] and have
    /// no side effects.
    pub fn register_node(
        &self,
        ctx: &mut StateContext<'_>,
        certificate: &Certificate,
    ) -> Result<Vec<u8>, AuthenticateError> {
        if ctx.is_simulation() {
            tracing::debug!(height = ctx.block_height(), "Simulated registration");
            return Ok(SIMULATION_SEED.to_vec());
        }

        let public_key = self.verifier.verify(certificate).map_err(|e| {
            tracing::warn!(error = %e, "Rejected registration certificate");
            e
        })?;
        let key_hex = hex::encode(&public_key);

        if let Some(existing) = self.store.get(ctx, &public_key)? {
            tracing::debug!(public_key = %key_hex, "Node already registered");
            return Ok(existing.encrypted_seed);
        }

        let encrypted_seed = self.enclave.get_encrypted_seed(certificate)?;
        let record = RegistrationRecord {
            certificate: certificate.clone(),
            encrypted_seed,
        };
        if let Some(existing) = self.store.insert_if_absent(ctx, &public_key, &record)? {
            return Ok(existing.encrypted_seed);
        }

        ctx.emit_event(Event::new(NODE_REGISTERED_EVENT).with_attribute("public_key", &key_hex));
        tracing::info!(
            public_key = %key_hex,
            height = ctx.block_height(),
            "Registered node"
        );
        Ok(record.encrypted_seed)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn registration(
        &self,
        ctx: &StateContext<'_>,
        public_key: &[u8],
    ) -> StoreResult<Option<RegistrationRecord>> {
        self.store.get(ctx, public_key)
    }

    pub fn encrypted_seed(
        &self,
        ctx: &StateContext<'_>,
        public_key: &[u8],
    ) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.store.get(ctx, public_key)?.map(|r| r.encrypted_seed))
    }

    pub fn is_registered(&self, ctx: &StateContext<'_>, public_key: &[u8]) -> StoreResult<bool> {
        self.store.contains(ctx, public_key)
    }

    // =========================================================================
    // Master certificates
    // =========================================================================

    /// Store a master certificate after checking that it verifies.
    pub fn set_master_certificate(
        &self,
        ctx: &mut StateContext<'_>,
        kind: MasterCertificateKind,
        certificate: &Certificate,
    ) -> Result<(), AuthenticateError> {
        self.verifier.verify(certificate)?;
        self.store.set_master_certificate(ctx, kind, certificate)?;
        Ok(())
    }

    pub fn master_certificate(
        &self,
        ctx: &StateContext<'_>,
        kind: MasterCertificateKind,
    ) -> StoreResult<Option<Certificate>> {
        self.store.master_certificate(ctx, kind)
    }

    /// Public key embedded in the stored master certificate.
    pub fn master_public_key(
        &self,
        ctx: &StateContext<'_>,
        kind: MasterCertificateKind,
    ) -> Result<Option<Vec<u8>>, AuthenticateError> {
        match self.store.master_certificate(ctx, kind)? {
            Some(certificate) => Ok(Some(self.verifier.verify(&certificate)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use base64ct::{Base64, Encoding};

    use crate::attestation::AttestationError;
    use crate::context::BlockHeader;
    use crate::enclave::EnclaveError;
    use crate::seed::{SeedConfig, SeedValidationError};
    use crate::storage::{Ledger, StoreError};

    /// Maps `b"cert:<key>"` and `b"cert:<key>#<anything>"` to `<key>`.
    #[derive(Default)]
    pub(crate) struct TableVerifier {
        pub calls: Cell<usize>,
    }

    impl AttestationVerifier for TableVerifier {
        fn verify(&self, certificate: &Certificate) -> Result<Vec<u8>, AttestationError> {
            self.calls.set(self.calls.get() + 1);
            let body = certificate
                .as_bytes()
                .strip_prefix(b"cert:")
                .ok_or_else(|| AttestationError::Malformed("unknown certificate".into()))?;
            let key = body.split(|b| *b == b'#').next().unwrap_or_default();
            Ok(key.to_vec())
        }
    }

    #[derive(Default)]
    pub(crate) struct CountingEnclave {
        pub loads: RefCell<Vec<(Vec<u8>, Vec<u8>, Vec<u8>)>>,
        pub seals: Cell<usize>,
        pub fail_with: Option<String>,
    }

    impl EnclaveGateway for CountingEnclave {
        fn load_seed(
            &self,
            master_key: &[u8],
            prefixed_seed: &[u8],
            api_key: &[u8],
        ) -> Result<(), EnclaveError> {
            if let Some(message) = &self.fail_with {
                return Err(EnclaveError::new(message.clone()));
            }
            self.loads.borrow_mut().push((
                master_key.to_vec(),
                prefixed_seed.to_vec(),
                api_key.to_vec(),
            ));
            Ok(())
        }

        fn get_encrypted_seed(&self, certificate: &Certificate) -> Result<Vec<u8>, EnclaveError> {
            if let Some(message) = &self.fail_with {
                return Err(EnclaveError::new(message.clone()));
            }
            self.seals.set(self.seals.get() + 1);
            let mut sealed = format!("sealed#{}:", self.seals.get()).into_bytes();
            sealed.extend_from_slice(certificate.as_bytes());
            Ok(sealed)
        }
    }

    fn sealed_key(bytes: usize) -> Vec<u8> {
        (0..bytes).map(|i| i as u8).collect()
    }

    fn write_seed_file(paths: &NodePaths, contents: &[u8]) {
        std::fs::create_dir_all(paths.config_dir()).unwrap();
        std::fs::write(paths.seed_config(), contents).unwrap();
    }

    fn current_seed_file(master_key: &[u8], encrypted_key: &str) -> Vec<u8> {
        seed::encode(&SeedConfig {
            master_key: master_key.to_vec(),
            encrypted_key: encrypted_key.to_string(),
        })
        .unwrap()
    }

    fn legacy_seed_file(master_cert: &[u8], encrypted_key: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "master_cert": Base64::encode_string(master_cert),
            "encrypted_key": encrypted_key,
        }))
        .unwrap()
    }

    // =========================================================================
    // initialize_node
    // =========================================================================

    #[test]
    fn current_seed_file_loads_prefixed_key() {
        let home = tempfile::tempdir().unwrap();
        let paths = NodePaths::new(home.path());
        let sealed = sealed_key(96);
        write_seed_file(&paths, &current_seed_file(b"master-key", &hex::encode(&sealed)));

        let enclave = CountingEnclave::default();
        initialize_node(&paths, &TableVerifier::default(), &enclave, b"api").unwrap();

        let mut expected = vec![96u8];
        expected.extend_from_slice(&sealed);
        assert_eq!(
            *enclave.loads.borrow(),
            vec![(b"master-key".to_vec(), expected, b"api".to_vec())]
        );
    }

    #[test]
    fn legacy_seed_file_is_equivalent_to_current() {
        let sealed = hex::encode(sealed_key(96));

        let current_home = tempfile::tempdir().unwrap();
        let current_paths = NodePaths::new(current_home.path());
        write_seed_file(&current_paths, &current_seed_file(b"master-key", &sealed));
        let current = CountingEnclave::default();
        initialize_node(&current_paths, &TableVerifier::default(), &current, b"api").unwrap();

        let legacy_home = tempfile::tempdir().unwrap();
        let legacy_paths = NodePaths::new(legacy_home.path());
        write_seed_file(&legacy_paths, &legacy_seed_file(b"cert:master-key", &sealed));
        let legacy = CountingEnclave::default();
        initialize_node(&legacy_paths, &TableVerifier::default(), &legacy, b"api").unwrap();

        assert_eq!(*current.loads.borrow(), *legacy.loads.borrow());
        assert_eq!(legacy.loads.borrow().len(), 1);
    }

    #[test]
    fn legacy_length_sealed_key_is_accepted() {
        let home = tempfile::tempdir().unwrap();
        let paths = NodePaths::new(home.path());
        write_seed_file(&paths, &current_seed_file(b"m", &hex::encode(sealed_key(48))));

        let enclave = CountingEnclave::default();
        initialize_node(&paths, &TableVerifier::default(), &enclave, b"api").unwrap();
        assert_eq!(enclave.loads.borrow()[0].1[0], 48);
    }

    #[test]
    fn key_one_character_short_fails_validation() {
        let home = tempfile::tempdir().unwrap();
        let paths = NodePaths::new(home.path());
        let mut short = hex::encode(sealed_key(96));
        short.pop();
        write_seed_file(&paths, &current_seed_file(b"master-key", &short));

        let enclave = CountingEnclave::default();
        let result = initialize_node(&paths, &TableVerifier::default(), &enclave, b"api");
        assert!(matches!(result, Err(SeedInitError::Validation(_))));
        assert!(enclave.loads.borrow().is_empty());
    }

    #[test]
    fn key_of_wrong_even_length_fails_validation() {
        let home = tempfile::tempdir().unwrap();
        let paths = NodePaths::new(home.path());
        write_seed_file(&paths, &current_seed_file(b"m", &hex::encode(sealed_key(95))));

        let (verifier, enclave) = (TableVerifier::default(), CountingEnclave::default());
        let result = initialize_node(&paths, &verifier, &enclave, b"api");
        assert!(matches!(
            result,
            Err(SeedInitError::Validation(SeedValidationError::Length { length: 192 }))
        ));
    }

    #[test]
    fn missing_seed_file_names_the_path() {
        let home = tempfile::tempdir().unwrap();
        let paths = NodePaths::new(home.path());

        let (verifier, enclave) = (TableVerifier::default(), CountingEnclave::default());
        let result = initialize_node(&paths, &verifier, &enclave, b"api");
        match result {
            Err(SeedInitError::NotFound { path }) => assert_eq!(path, paths.seed_config()),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn undecodable_seed_file_fails() {
        let home = tempfile::tempdir().unwrap();
        let paths = NodePaths::new(home.path());
        write_seed_file(&paths, b"not json");

        let (verifier, enclave) = (TableVerifier::default(), CountingEnclave::default());
        let result = initialize_node(&paths, &verifier, &enclave, b"api");
        assert!(matches!(result, Err(SeedInitError::Decode(_))));
    }

    #[test]
    fn enclave_rejection_is_reported_verbatim() {
        let home = tempfile::tempdir().unwrap();
        let paths = NodePaths::new(home.path());
        write_seed_file(&paths, &current_seed_file(b"m", &hex::encode(sealed_key(96))));

        let enclave = CountingEnclave {
            fail_with: Some("seed does not unseal".into()),
            ..CountingEnclave::default()
        };
        let result = initialize_node(&paths, &TableVerifier::default(), &enclave, b"api");
        assert!(matches!(result, Err(SeedInitError::Enclave(m)) if m == "seed does not unseal"));
    }

    #[test]
    fn api_key_is_resolved_before_the_seed_file() {
        let home = tempfile::tempdir().unwrap();
        let paths = NodePaths::new(home.path());
        let enclave = CountingEnclave::default();

        let result = RegistrationService::new(
            &paths,
            TableVerifier::default(),
            &enclave,
            false,
            &ApiKeySource::File(paths.api_key()),
        );
        assert!(matches!(result, Err(SeedInitError::ApiKey(_))));
    }

    #[test]
    fn bootstrap_node_skips_initialization() {
        let home = tempfile::tempdir().unwrap();
        let paths = NodePaths::new(home.path());
        let enclave = CountingEnclave::default();

        let service = RegistrationService::new(
            &paths,
            TableVerifier::default(),
            &enclave,
            true,
            &ApiKeySource::File(paths.api_key()),
        );
        assert!(service.is_ok());
        assert!(enclave.loads.borrow().is_empty());
    }

    #[test]
    fn joining_node_reads_api_key_file() {
        let home = tempfile::tempdir().unwrap();
        let paths = NodePaths::new(home.path());
        write_seed_file(&paths, &current_seed_file(b"m", &hex::encode(sealed_key(96))));
        std::fs::write(paths.api_key(), "file-key\n").unwrap();
        let enclave = CountingEnclave::default();

        RegistrationService::new(
            &paths,
            TableVerifier::default(),
            &enclave,
            false,
            &ApiKeySource::File(paths.api_key()),
        )
        .unwrap();
        assert_eq!(enclave.loads.borrow()[0].2, b"file-key");
    }

    // =========================================================================
    // register_node
    // =========================================================================

    fn temp_ledger() -> (Ledger, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(&dir.path().join("ledger.redb")).unwrap();
        (ledger, dir)
    }

    pub(crate) fn service<'a>(
        verifier: &'a TableVerifier,
        enclave: &'a CountingEnclave,
    ) -> RegistrationService<&'a TableVerifier, &'a CountingEnclave> {
        RegistrationService::with_store(verifier, enclave, RegistrationStore::default())
    }

    fn block(height: u64) -> BlockHeader {
        BlockHeader::new(height, 1_000_000)
    }

    #[test]
    fn new_certificate_gets_sealed_seed_and_record() {
        let (ledger, _dir) = temp_ledger();
        let (verifier, enclave) = (TableVerifier::default(), CountingEnclave::default());
        let service = service(&verifier, &enclave);
        let cert = Certificate::new(b"cert:K1".to_vec());

        let executed = ledger
            .execute(block(5), |ctx| service.register_node(ctx, &cert))
            .unwrap();
        assert_eq!(executed.value, b"sealed#1:cert:K1");
        assert_eq!(executed.events.len(), 1);
        assert_eq!(executed.events[0].kind, NODE_REGISTERED_EVENT);
        assert_eq!(
            executed.events[0].attribute("public_key"),
            Some(hex::encode(b"K1").as_str())
        );

        let record = ledger
            .query(block(6), |ctx| service.registration(ctx, b"K1"))
            .unwrap()
            .unwrap();
        assert_eq!(record.certificate, cert);
        assert_eq!(record.encrypted_seed, executed.value);
    }

    #[test]
    fn repeat_registration_returns_stored_seed() {
        let (ledger, _dir) = temp_ledger();
        let (verifier, enclave) = (TableVerifier::default(), CountingEnclave::default());
        let service = service(&verifier, &enclave);

        let first = ledger
            .execute(block(5), |ctx| {
                service.register_node(ctx, &Certificate::new(b"cert:K1".to_vec()))
            })
            .unwrap();

        let again = ledger
            .execute(block(6), |ctx| {
                service.register_node(ctx, &Certificate::new(b"cert:K1".to_vec()))
            })
            .unwrap();
        let other_cert_same_key = ledger
            .execute(block(7), |ctx| {
                service.register_node(ctx, &Certificate::new(b"cert:K1#renewed".to_vec()))
            })
            .unwrap();

        assert_eq!(again.value, first.value);
        assert_eq!(other_cert_same_key.value, first.value);
        assert!(again.events.is_empty());
        assert_eq!(enclave.seals.get(), 1);

        let record = ledger
            .query(block(8), |ctx| service.registration(ctx, b"K1"))
            .unwrap()
            .unwrap();
        assert_eq!(record.certificate, Certificate::new(b"cert:K1".to_vec()));
    }

    #[test]
    fn repeat_within_one_transition_is_idempotent() {
        let (ledger, _dir) = temp_ledger();
        let (verifier, enclave) = (TableVerifier::default(), CountingEnclave::default());
        let service = service(&verifier, &enclave);
        let cert = Certificate::new(b"cert:K1".to_vec());

        let (a, b) = ledger
            .execute(block(5), |ctx| {
                Ok::<_, AuthenticateError>((
                    service.register_node(ctx, &cert)?,
                    service.register_node(ctx, &cert)?,
                ))
            })
            .unwrap()
            .value;
        assert_eq!(a, b);
        assert_eq!(enclave.seals.get(), 1);
    }

    #[test]
    fn simulation_has_no_side_effects() {
        let (ledger, _dir) = temp_ledger();
        let (verifier, enclave) = (TableVerifier::default(), CountingEnclave::default());
        let service = service(&verifier, &enclave);

        let executed = ledger
            .execute(BlockHeader::new(9, 0), |ctx| {
                service.register_node(ctx, &Certificate::new(b"cert:K1".to_vec()))
            })
            .unwrap();

        assert_eq!(executed.value, vec![0u8; 32]);
        assert!(executed.events.is_empty());
        assert_eq!(verifier.calls.get(), 0);
        assert_eq!(enclave.seals.get(), 0);
        let registered = ledger
            .query(block(10), |ctx| service.is_registered(ctx, b"K1"))
            .unwrap();
        assert!(!registered);
    }

    #[test]
    fn genesis_block_without_gas_limit_is_not_simulated() {
        let (ledger, _dir) = temp_ledger();
        let (verifier, enclave) = (TableVerifier::default(), CountingEnclave::default());
        let service = service(&verifier, &enclave);

        let executed = ledger
            .execute(BlockHeader::new(0, 0), |ctx| {
                service.register_node(ctx, &Certificate::new(b"cert:K1".to_vec()))
            })
            .unwrap();
        assert_eq!(executed.value, b"sealed#1:cert:K1");
    }

    #[test]
    fn rejected_certificate_is_not_stored() {
        let (ledger, _dir) = temp_ledger();
        let (verifier, enclave) = (TableVerifier::default(), CountingEnclave::default());
        let service = service(&verifier, &enclave);

        let result = ledger.execute(block(5), |ctx| {
            service.register_node(ctx, &Certificate::new(b"forged".to_vec()))
        });
        assert!(matches!(result, Err(AuthenticateError::Attestation(_))));
        assert_eq!(enclave.seals.get(), 0);
    }

    #[test]
    fn enclave_failure_leaves_no_record() {
        let (ledger, _dir) = temp_ledger();
        let verifier = TableVerifier::default();
        let enclave = CountingEnclave {
            fail_with: Some("enclave offline".into()),
            ..CountingEnclave::default()
        };
        let service = service(&verifier, &enclave);

        let result = ledger.execute(block(5), |ctx| {
            service.register_node(ctx, &Certificate::new(b"cert:K1".to_vec()))
        });
        assert!(matches!(result, Err(AuthenticateError::Enclave(m)) if m == "enclave offline"));

        let seed = ledger
            .query(block(6), |ctx| service.encrypted_seed(ctx, b"K1"))
            .unwrap();
        assert_eq!(seed, None);
    }

    #[test]
    fn master_public_key_comes_from_verified_certificate() {
        let (ledger, _dir) = temp_ledger();
        let (verifier, enclave) = (TableVerifier::default(), CountingEnclave::default());
        let service = service(&verifier, &enclave);
        let kind = MasterCertificateKind::NodeExchange;

        let rejected = ledger.execute(block(1), |ctx| {
            service.set_master_certificate(ctx, kind, &Certificate::new(b"bogus".to_vec()))
        });
        assert!(matches!(rejected, Err(AuthenticateError::Attestation(_))));

        let master = Certificate::new(b"cert:MASTER".to_vec());
        ledger
            .execute(block(1), |ctx| service.set_master_certificate(ctx, kind, &master))
            .unwrap();

        let key = ledger
            .query(block(2), |ctx| service.master_public_key(ctx, kind))
            .unwrap();
        assert_eq!(key, Some(b"MASTER".to_vec()));

        let io = ledger
            .query(block(2), |ctx| {
                let io = service.master_certificate(ctx, MasterCertificateKind::IoExchange)?;
                Ok::<_, StoreError>(io)
            })
            .unwrap();
        assert_eq!(io, None);
    }

    #[test]
    fn one_enclave_registers_once_whatever_its_key_encoding() {
        use k256::ecdsa::{SigningKey, VerifyingKey};
        use k256::elliptic_curve::sec1::ToEncodedPoint;

        use crate::attestation::{
            issue_certificate, AttestationPolicy, EnclaveReport, SignedReportVerifier,
        };

        let authority = SigningKey::from_slice(&[0x11; 32]).unwrap();
        let verifier = SignedReportVerifier::new(AttestationPolicy::new(vec![
            VerifyingKey::from(&authority),
        ]));
        let enclave = CountingEnclave::default();
        let service = RegistrationService::with_store(
            &verifier,
            &enclave,
            RegistrationStore::new(JsonRecordCodec),
        );

        let joiner = k256::SecretKey::from_slice(&[0x22; 32]).unwrap().public_key();
        let certificate_for = |compress: bool| {
            issue_certificate(
                &authority,
                EnclaveReport {
                    enclave_public_key: joiner.to_encoded_point(compress).as_bytes().to_vec(),
                    mr_enclave: "aa".repeat(32),
                    mr_signer: "bb".repeat(32),
                    isv_svn: 1,
                },
            )
            .unwrap()
        };

        let (ledger, _dir) = temp_ledger();
        let first = ledger
            .execute(block(5), |ctx| service.register_node(ctx, &certificate_for(true)))
            .unwrap();
        let second = ledger
            .execute(block(6), |ctx| service.register_node(ctx, &certificate_for(false)))
            .unwrap();

        assert_eq!(second.value, first.value);
        assert!(second.events.is_empty());
        assert_eq!(enclave.seals.get(), 1);

        let records = ledger
            .query(block(7), |ctx| service.store().list(ctx))
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, joiner.to_encoded_point(true).as_bytes().to_vec());
    }
}
