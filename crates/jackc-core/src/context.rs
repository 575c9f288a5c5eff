use jackc_table::SymbolTable;

/// Which of the three subroutine shapes is being compiled; determines the
/// prologue emitted before its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Function,
    Method,
    Constructor,
}

impl Flavor {
    pub fn from_keyword(kw: &str) -> Option<Self> {
        match kw {
            "function" => Some(Flavor::Function),
            "method" => Some(Flavor::Method),
            "constructor" => Some(Flavor::Constructor),
            _ => None,
        }
    }
}

/// Per-class compilation state: the two symbol scopes, the subroutine
/// currently being compiled, and a label counter threaded through the
/// parse instead of kept as a global.
pub struct CompileContext {
    pub class_name: String,
    pub class_table: SymbolTable,
    pub subroutine_table: SymbolTable,
    pub subroutine_name: String,
    pub subroutine_flavor: Flavor,
    label_counter: usize,
}

impl CompileContext {
    pub fn new() -> Self {
        CompileContext {
            class_name: String::new(),
            class_table: SymbolTable::new(),
            subroutine_table: SymbolTable::new(),
            subroutine_name: String::new(),
            subroutine_flavor: Flavor::Function,
            label_counter: 0,
        }
    }

    /// The next unused label index. Freshness only needs to hold within a
    /// class, so this counter never resets mid-class.
    pub fn next_label(&mut self) -> usize {
        let n = self.label_counter;
        self.label_counter += 1;
        n
    }
}

impl Default for CompileContext {
    fn default() -> Self {
        Self::new()
    }
}
