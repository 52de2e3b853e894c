//! This module provides functions for analyzing machine configurations to detect
//! structural errors, unknown nodes, capability violations, and ambiguous transition
//! graphs before a machine is admitted into the engine.

use crate::types::{HeadCapability, MachineConfig, NodeId, SimulationError};
use std::collections::HashSet;

/// Represents the errors that can be found during analysis of a machine configuration.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// Structural problems: zero heads, per-head arrays whose lengths do not
    /// match the declared head count, statements with the wrong number of
    /// head transitions.
    StructuralError(String),
    /// The start node does not appear in the node list.
    InvalidStartNode(NodeId),
    /// A statement references a node missing from the node list.
    UndefinedNode(NodeId),
    /// A statement instructs a head to act against its capability.
    PermissionViolation(String),
    /// Two statements denormalize into the same (node, reads) lookup key.
    AmbiguousTransition(NodeId),
}

impl From<AnalysisError> for SimulationError {
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::StructuralError(msg) => SimulationError::InvalidConfiguration(msg),
            AnalysisError::InvalidStartNode(node) => SimulationError::InvalidConfiguration(
                format!("Start node {} is not in the node list", node),
            ),
            AnalysisError::UndefinedNode(node) => SimulationError::InvalidConfiguration(format!(
                "Transition statement references undefined node {}",
                node
            )),
            AnalysisError::PermissionViolation(msg) => SimulationError::PermissionViolation(msg),
            AnalysisError::AmbiguousTransition(node) => SimulationError::InvalidConfiguration(
                format!("Duplicate transition key from node {}", node),
            ),
        }
    }
}

/// Analyzes a machine configuration for structural and logical errors.
///
/// This runs every check and returns the first error found, converted into a
/// [`SimulationError`]. Tape existence and initial head positions are not
/// checked here; they depend on the engine's tape pool and are validated by
/// `Engine::add_machine`.
///
/// # Arguments
///
/// * `config` - The machine configuration to analyze.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(SimulationError)` describing the first violated rule.
pub fn analyze(config: &MachineConfig) -> Result<(), SimulationError> {
    let errors = [
        check_structure,
        check_nodes,
        check_permissions,
        check_ambiguity,
    ]
    .iter()
    .filter_map(|check| check(config).err())
    .collect::<Vec<_>>();

    match errors.into_iter().next() {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Checks basic structural requirements: at least one head, parallel arrays
/// matching the declared head count, and statements carrying exactly one head
/// transition per head.
fn check_structure(config: &MachineConfig) -> Result<(), AnalysisError> {
    if config.head_count == 0 {
        return Err(AnalysisError::StructuralError(
            "A machine requires at least one head".to_string(),
        ));
    }

    let arrays = [
        ("capabilities", config.capabilities.len()),
        ("positions", config.positions.len()),
        ("tapes", config.tapes.len()),
    ];
    for (name, len) in arrays {
        if len != config.head_count {
            return Err(AnalysisError::StructuralError(format!(
                "Head array '{}' has {} entries for {} heads",
                name, len, config.head_count
            )));
        }
    }

    for statement in &config.statements {
        if statement.heads.len() != config.head_count {
            return Err(AnalysisError::StructuralError(format!(
                "Statement from node {} has {} head transitions for {} heads",
                statement.source,
                statement.heads.len(),
                config.head_count
            )));
        }
    }

    Ok(())
}

/// Checks that the start node and every statement's source/target node appear
/// in the node list.
fn check_nodes(config: &MachineConfig) -> Result<(), AnalysisError> {
    let nodes: HashSet<NodeId> = config.nodes.iter().copied().collect();

    if !nodes.contains(&config.start_node) {
        return Err(AnalysisError::InvalidStartNode(config.start_node));
    }

    for statement in &config.statements {
        for node in [statement.source, statement.target] {
            if !nodes.contains(&node) {
                return Err(AnalysisError::UndefinedNode(node));
            }
        }
    }

    Ok(())
}

/// Checks capability consistency: a read-only head's write symbol must be the
/// no-op sentinel, and a write-only head's read symbol must be the no-op
/// sentinel (it never presents a real symbol to the lookup).
fn check_permissions(config: &MachineConfig) -> Result<(), AnalysisError> {
    for statement in &config.statements {
        // zip: a length mismatch is check_structure's finding, not a panic here
        for (index, (head, &capability)) in
            statement.heads.iter().zip(&config.capabilities).enumerate()
        {
            match capability {
                HeadCapability::ReadOnly => {
                    if head.write.is_some() {
                        return Err(AnalysisError::PermissionViolation(format!(
                            "Statement from node {} writes {:?} with read-only head {}",
                            statement.source, head.write, index
                        )));
                    }
                }
                HeadCapability::WriteOnly => {
                    if head.read.is_some() {
                        return Err(AnalysisError::PermissionViolation(format!(
                            "Statement from node {} expects read {:?} from write-only head {}",
                            statement.source, head.read, index
                        )));
                    }
                }
                HeadCapability::ReadWrite => {}
            }
        }
    }

    Ok(())
}

/// Checks that no two statements denormalize into the same lookup key.
fn check_ambiguity(config: &MachineConfig) -> Result<(), AnalysisError> {
    let mut seen: HashSet<(NodeId, Vec<Option<char>>)> = HashSet::new();

    for statement in &config.statements {
        let reads: Vec<Option<char>> = statement.heads.iter().map(|h| h.read).collect();
        if !seen.insert((statement.source, reads)) {
            return Err(AnalysisError::AmbiguousTransition(statement.source));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HeadTransition, TransitionStatement};

    fn valid_config() -> MachineConfig {
        MachineConfig {
            head_count: 2,
            capabilities: vec![HeadCapability::ReadOnly, HeadCapability::WriteOnly],
            positions: vec![0, 0],
            tapes: vec![0, 1],
            nodes: vec![0, 1],
            statements: vec![TransitionStatement {
                source: 0,
                target: 1,
                heads: vec![
                    HeadTransition {
                        read: Some('a'),
                        write: None,
                        shift: 1,
                    },
                    HeadTransition {
                        read: None,
                        write: Some('a'),
                        shift: 1,
                    },
                ],
            }],
            start_node: 0,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(analyze(&valid_config()).is_ok());
    }

    #[test]
    fn test_mismatched_head_arrays() {
        let mut config = valid_config();
        config.positions.push(5);
        assert!(matches!(
            analyze(&config),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_zero_heads_rejected() {
        let mut config = valid_config();
        config.head_count = 0;
        config.capabilities.clear();
        config.positions.clear();
        config.tapes.clear();
        config.statements.clear();
        assert!(matches!(
            analyze(&config),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_statement_head_count_mismatch() {
        let mut config = valid_config();
        config.statements[0].heads.pop();
        assert!(matches!(
            analyze(&config),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_unknown_start_node() {
        let mut config = valid_config();
        config.start_node = 9;
        assert!(matches!(
            analyze(&config),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_statement_references_unknown_node() {
        let mut config = valid_config();
        config.statements[0].target = 7;
        assert!(matches!(
            analyze(&config),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_read_only_head_must_not_write() {
        let mut config = valid_config();
        config.statements[0].heads[0].write = Some('x');
        assert!(matches!(
            analyze(&config),
            Err(SimulationError::PermissionViolation(_))
        ));
    }

    #[test]
    fn test_write_only_head_must_not_read() {
        let mut config = valid_config();
        config.statements[0].heads[1].read = Some('x');
        assert!(matches!(
            analyze(&config),
            Err(SimulationError::PermissionViolation(_))
        ));
    }

    #[test]
    fn test_duplicate_lookup_key_rejected() {
        let mut config = valid_config();
        let mut duplicate = config.statements[0].clone();
        duplicate.target = 0;
        duplicate.heads[1].write = Some('b');
        config.statements.push(duplicate);
        assert!(matches!(
            analyze(&config),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }
}
