//! Interactive network selection.
//!
//! Prompting lives behind the [`Prompt`] trait; turning an ordinal into a
//! network is the pure [`resolve_selection`].

use std::io::{BufRead, Write};

use crate::{
    error::{DeployError, Result},
    registry::NetworkConfig,
};

/// The role a selected network plays in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Source,
    Target,
}

/// Source of operator input.
pub trait Prompt {
    /// Show the menu for `role` and read back one integer ordinal.
    fn choose(&mut self, role: Role, networks: &[NetworkConfig]) -> Result<i64>;
}

impl<P: Prompt + ?Sized> Prompt for &mut P {
    fn choose(&mut self, role: Role, networks: &[NetworkConfig]) -> Result<i64> {
        (**self).choose(role, networks)
    }
}

/// Resolve a 1-based ordinal against the registry.
pub fn resolve_selection<'a>(
    networks: &'a [NetworkConfig],
    role: Role,
    ordinal: i64,
) -> Result<&'a NetworkConfig> {
    usize::try_from(ordinal)
        .ok()
        .and_then(|k| k.checked_sub(1))
        .and_then(|index| networks.get(index))
        .ok_or_else(|| DeployError::Selection {
            role: role.to_string(),
            ordinal,
            max: networks.len(),
        })
}

/// Prompt for `role` and resolve the answer.
pub fn select_network<P: Prompt>(
    networks: &[NetworkConfig],
    role: Role,
    prompt: &mut P,
) -> Result<NetworkConfig> {
    let ordinal = prompt.choose(role, networks)?;
    let network = resolve_selection(networks, role, ordinal)?;

    tracing::info!(
        role = %role,
        chain_id = network.chain_id,
        network = %network.description,
        "Network selected"
    );
    Ok(network.clone())
}

/// Numbered-menu prompt over any line-based reader and writer.
///
/// Lines that are not integers are re-prompted; range checking is left to
/// [`resolve_selection`].
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn render_menu(&mut self, role: Role, networks: &[NetworkConfig]) -> std::io::Result<()> {
        let role = role.to_string().to_uppercase();
        writeln!(self.output, "\nSelect the {role} chain:")?;
        for (index, network) in networks.iter().enumerate() {
            writeln!(self.output, "{}: {}", index + 1, network.description)?;
        }
        Ok(())
    }
}

impl LinePrompt<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompt on the process terminal.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn choose(&mut self, role: Role, networks: &[NetworkConfig]) -> Result<i64> {
        let io_failure = |e: std::io::Error| DeployError::NoSelection {
            role: role.to_string(),
            reason: e.to_string(),
        };

        self.render_menu(role, networks).map_err(io_failure)?;

        loop {
            write!(
                self.output,
                "\nEnter the number for the {} chain: ",
                role.to_string().to_uppercase()
            )
            .and_then(|_| self.output.flush())
            .map_err(io_failure)?;

            let mut line = String::new();
            if self.input.read_line(&mut line).map_err(io_failure)? == 0 {
                return Err(DeployError::NoSelection {
                    role: role.to_string(),
                    reason: "input closed".to_string(),
                });
            }

            match line.trim().parse::<i64>() {
                Ok(ordinal) => return Ok(ordinal),
                Err(_) => {
                    tracing::debug!(input = %line.trim(), "Ignoring non-numeric selection");
                    writeln!(self.output, "Input must be an integer.").map_err(io_failure)?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::Address;

    fn networks(count: u64) -> Vec<NetworkConfig> {
        (1..=count)
            .map(|chain_id| NetworkConfig {
                description: format!("Network {chain_id}"),
                chain_id,
                rpc_endpoint: format!("http://localhost:{}", 8545 + chain_id),
                token_bridge: Address::repeat_byte(1),
                wormhole_relayer: Address::repeat_byte(2),
                wormhole: Address::repeat_byte(3),
            })
            .collect()
    }

    #[test]
    fn test_resolve_every_valid_ordinal() {
        let networks = networks(4);
        for k in 1..=4i64 {
            let network = resolve_selection(&networks, Role::Source, k).unwrap();
            assert_eq!(network, &networks[(k - 1) as usize]);
        }
    }

    #[test]
    fn test_resolve_out_of_range() {
        let networks = networks(3);
        for ordinal in [0, -1, 4, 100, i64::MIN, i64::MAX] {
            let err = resolve_selection(&networks, Role::Target, ordinal).unwrap_err();
            assert!(
                matches!(err, DeployError::Selection { ordinal: o, max: 3, .. } if o == ordinal),
                "unexpected error for {ordinal}: {err}"
            );
        }
    }

    #[test]
    fn test_resolve_empty_registry() {
        assert!(resolve_selection(&[], Role::Source, 1).is_err());
    }

    #[test]
    fn test_line_prompt_renders_menu() {
        let networks = networks(2);
        let mut output = Vec::new();
        let mut prompt = LinePrompt::new("2\n".as_bytes(), &mut output);

        let selected = select_network(&networks, Role::Source, &mut prompt).unwrap();
        assert_eq!(selected.chain_id, 2);

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Select the SOURCE chain:"));
        assert!(output.contains("1: Network 1\n2: Network 2\n"));
        assert!(output.contains("Enter the number for the SOURCE chain: "));
    }

    #[test]
    fn test_line_prompt_reprompts_non_numeric() {
        let networks = networks(2);
        let mut output = Vec::new();
        let mut prompt = LinePrompt::new("abc\n\n 1 \n".as_bytes(), &mut output);

        assert_eq!(prompt.choose(Role::Target, &networks).unwrap(), 1);
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("Input must be an integer.").count(), 2);
    }

    #[test]
    fn test_line_prompt_closed_input() {
        let networks = networks(2);
        let mut prompt = LinePrompt::new("".as_bytes(), Vec::new());
        let err = prompt.choose(Role::Source, &networks).unwrap_err();
        assert!(matches!(err, DeployError::NoSelection { .. }));
    }

    #[test]
    fn test_select_network_out_of_range() {
        let networks = networks(2);
        let mut prompt = LinePrompt::new("3\n".as_bytes(), Vec::new());
        let err = select_network(&networks, Role::Target, &mut prompt).unwrap_err();
        assert!(matches!(err, DeployError::Selection { ordinal: 3, .. }));
    }
}
