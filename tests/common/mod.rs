//! Shared helpers: self-signed certificate material written to a temp dir
//!
//! Also compiled into the crate's unit tests and the benches.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::extension::SubjectAlternativeName;
use openssl::x509::{X509Builder, X509NameBuilder, X509};

/// Self-signed certificate for `cn`, with `cn` also as DNS SAN
pub fn self_signed(cn: &str) -> (X509, PKey<Private>) {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    let key = PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_nid(Nid::COMMONNAME, cn).unwrap();
    let name = name.build();

    let mut serial = BigNum::new().unwrap();
    serial.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    builder.set_serial_number(&serial.to_asn1_integer().unwrap()).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
    builder.set_not_after(&Asn1Time::days_from_now(365).unwrap()).unwrap();
    let san = SubjectAlternativeName::new()
        .dns(cn)
        .build(&builder.x509v3_context(None, None))
        .unwrap();
    builder.append_extension(san).unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();

    (builder.build(), key)
}

/// Temp directory holding PEM files for one test
pub struct PemDir {
    dir: tempfile::TempDir,
}

impl PemDir {
    pub fn new() -> Self {
        PemDir {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn write(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    /// Write a bundle of one fresh certificate per CN
    pub fn ca_bundle(&self, name: &str, cns: &[&str]) -> PathBuf {
        let mut pem = Vec::new();
        for cn in cns {
            pem.extend(self_signed(cn).0.to_pem().unwrap());
        }
        self.write(name, &pem)
    }

    /// Write a certificate and its key; returns (cert path, key path)
    pub fn key_pair(&self, stem: &str, cert: &X509, key: &PKey<Private>) -> (PathBuf, PathBuf) {
        let cert_path = self.write(&format!("{}.pem", stem), &cert.to_pem().unwrap());
        let key_path = self.write(
            &format!("{}.key", stem),
            &key.private_key_to_pem_pkcs8().unwrap(),
        );
        (cert_path, key_path)
    }
}

pub fn path_str(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}
