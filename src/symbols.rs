use std::io::{self, Write};

/// Role a symbol of interest plays for the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolRole {
    Start,
    Exit,
    ToHost,
}

impl SymbolRole {
    pub const ALL: [SymbolRole; 3] = [SymbolRole::Start, SymbolRole::Exit, SymbolRole::ToHost];

    fn index(self) -> usize {
        match self {
            SymbolRole::Start => 0,
            SymbolRole::Exit => 1,
            SymbolRole::ToHost => 2,
        }
    }
}

/// Names of the three symbols to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTargets {
    pub start: String,
    pub exit: String,
    pub tohost: String,
}

impl Default for SymbolTargets {
    fn default() -> Self {
        Self {
            start: "_start".to_string(),
            exit: "exit".to_string(),
            tohost: "tohost".to_string(),
        }
    }
}

impl SymbolTargets {
    pub fn name(&self, role: SymbolRole) -> &str {
        match role {
            SymbolRole::Start => &self.start,
            SymbolRole::Exit => &self.exit,
            SymbolRole::ToHost => &self.tohost,
        }
    }
}

/// Resolved addresses, filled while scanning symbol tables.
///
/// The first symbol seen for a name wins; later symbols with the same name
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolAddresses {
    addrs: [Option<u64>; 3],
}

impl SymbolAddresses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, role: SymbolRole) -> Option<u64> {
        self.addrs[role.index()]
    }

    pub fn start(&self) -> Option<u64> {
        self.get(SymbolRole::Start)
    }

    pub fn exit(&self) -> Option<u64> {
        self.get(SymbolRole::Exit)
    }

    pub fn tohost(&self) -> Option<u64> {
        self.get(SymbolRole::ToHost)
    }

    /// Offer one symbol table entry. Returns the role it resolved, if any.
    ///
    /// A name only ever binds to the first role configured with that name.
    pub fn offer(
        &mut self,
        targets: &SymbolTargets,
        name: &[u8],
        value: u64,
    ) -> Option<SymbolRole> {
        let role = SymbolRole::ALL
            .into_iter()
            .find(|role| targets.name(*role).as_bytes() == name)?;
        let slot = &mut self.addrs[role.index()];
        if slot.is_some() {
            return None;
        }
        *slot = Some(value);
        Some(role)
    }

    /// Write the side file: one `name  0xADDR` line per resolved symbol.
    pub fn write_table<W: Write>(&self, out: &mut W, targets: &SymbolTargets) -> io::Result<()> {
        for role in SymbolRole::ALL {
            let name = targets.name(role);
            match self.get(role) {
                Some(addr) => writeln!(out, "{:<9} 0x{:x}", name, addr)?,
                None => log::info!("    No '{}' symbol found", name),
            }
        }
        Ok(())
    }
}
