//! # Distribution Assembly
//!
//! Runs normalize → build → prove and packages the result as a
//! [`DistributorInfo`]: the root, the token total and one claim record per
//! recipient with its proof attached.

use rayon::prelude::*;

use mdist_balances::{normalize, NormalizedBalance, RawBalances};
use mdist_core::{ClaimRecord, DistributorError, DistributorInfo, TokenTotal};

use crate::builder::{MerkleTree, TreeLeaf};

impl From<&NormalizedBalance> for TreeLeaf {
    fn from(balance: &NormalizedBalance) -> Self {
        Self {
            index: balance.index,
            account: balance.account,
            amount: balance.amount,
        }
    }
}

/// Normalize raw balances and build the full distribution.
///
/// # Errors
///
/// Any normalization error aborts the run before a tree is built.
pub fn generate_distribution(raw: RawBalances) -> Result<DistributorInfo, DistributorError> {
    let balances = normalize(raw)?;
    build_distribution(&balances)
}

/// Build the tree and claims for an already-normalized leaf set.
pub fn build_distribution(
    balances: &[NormalizedBalance],
) -> Result<DistributorInfo, DistributorError> {
    tracing::info!(leaves = balances.len(), "constructing tree");
    let leaves: Vec<TreeLeaf> = balances.iter().map(TreeLeaf::from).collect();
    let tree = MerkleTree::build(&leaves)?;
    let root = tree.root();
    tracing::info!(root = %root, layers = tree.layers().len(), "tree constructed");

    tracing::info!("generating claims");
    let claims = balances
        .par_iter()
        .enumerate()
        .map(|(i, balance)| -> Result<ClaimRecord, DistributorError> {
            Ok(ClaimRecord {
                index: balance.index,
                address: balance.account,
                amount: balance.amount,
                proof: tree.proof_for(i)?,
                flags: balance.flags.clone(),
            })
        })
        .collect::<Result<Vec<_>, DistributorError>>()?;

    let token_total = TokenTotal::from_amounts(balances.iter().map(|b| &b.amount));
    tracing::info!(
        recipients = claims.len(),
        token_total = %token_total,
        "claims generated"
    );

    Ok(DistributorInfo {
        merkle_root: root,
        token_total,
        claims,
    })
}
