//! The command-line service facade (spec.md §4.7/§6), ported from
//! `application.service.AppServise`.

use std::rc::Rc;
use std::str::FromStr;

use strum_macros::EnumString;

use crate::error::{Error, Result};
use crate::master::MasterGroup;
use crate::subgroup::Subgroup;

/// The facade's fixed command dictionary, matching
/// `AppServise._create_cmd_func_dict` one entry at a time. `EnumString`
/// gives each command its `Cmd[Arg]` spelling without a hand-written
/// `match` over raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
enum Command {
    #[strum(serialize = "?")]
    Overview,
    Elements,
    Table,
    ConjClass,
    ConjCount,
    Isomorphic,
    IsAbelian,
    IsPerfect,
    IsSolvable,
    IsSimple,
    Center,
    Centrizer,
    Derived,
    DerivedSeries,
    Normal,
    DirectDecompose,
    SemidirectDecompose,
    Decompose,
}

/// A parsed `Cmd[Arg]` command string.
struct CmdExprPair {
    cmd: String,
    expr: String,
}

/// Splits `cmd_text` on its first `[` and last `]`, matching
/// `AppServise._divide_command_expr`: the argument may itself contain
/// brackets (nested group names), so only the outermost pair is used.
fn divide_command_expr(cmd_text: &str) -> Result<CmdExprPair> {
    let ini = cmd_text.find('[').ok_or(Error::ParseError)?;
    let fin = cmd_text.rfind(']').ok_or(Error::ParseError)?;
    if !(ini < fin && fin == cmd_text.len() - 1) {
        return Err(Error::ParseError);
    }
    Ok(CmdExprPair {
        cmd: cmd_text[..ini].to_string(),
        expr: cmd_text[ini + 1..fin].to_string(),
    })
}

/// Wraps a [`MasterGroup`] with the command dictionary spec.md §6
/// describes, translating raw `Cmd[Arg]` strings into formatted reports.
pub struct Service {
    master: Rc<MasterGroup>,
}

impl Service {
    /// Builds a facade over an already-generated master group.
    pub fn new(master: Rc<MasterGroup>) -> Self {
        Self { master }
    }

    /// Executes one `Cmd[Arg]` command string, returning the formatted
    /// report or an error describing why it could not be executed.
    pub fn exec(&self, cmd_text: &str) -> Result<String> {
        let pair = divide_command_expr(cmd_text)?;
        let command =
            Command::from_str(&pair.cmd).map_err(|_| Error::UnknownCommand(pair.cmd.clone()))?;
        let group = self.master.name_to_group(&pair.expr)?;
        Ok(match command {
            Command::Overview => self.overview(&group),
            Command::Elements => self.elements(&group),
            Command::Table => self.cayley_table(&group),
            Command::ConjClass => self.conj_class(&group),
            Command::ConjCount => self.conj_count(&group),
            Command::Isomorphic => self.isomorphic(&group),
            Command::IsAbelian => self.is_abelian(&group),
            Command::IsPerfect => self.is_perfect(&group),
            Command::IsSolvable => self.is_solvable(&group),
            Command::IsSimple => self.is_simple(&group),
            Command::Center => self.center(&group),
            Command::Centrizer => self.centralizer(&group),
            Command::Derived => self.derived(&group),
            Command::DerivedSeries => self.derived_series(&group),
            Command::Normal => self.normal(&group),
            Command::DirectDecompose => self.direct_decompose(&group),
            Command::SemidirectDecompose => self.semidirect_decompose(&group),
            Command::Decompose => self.decompose(&group),
        })
    }

    fn display_name(&self, group: &Subgroup) -> String {
        group
            .name()
            .unwrap_or_else(|| format!("<unnamed order-{}>", group.order()))
    }

    fn overview(&self, group: &Rc<Subgroup>) -> String {
        let name = self.display_name(group);
        let mut text = format!(
            "Overview of {name}:\nName\tOrder\tIsomorphic\n{name}\t{}\t{}\n\n\
             IsAbelian\t{}\nIsPerfect\t{}\nIsSimple\t{}\nIsSolvable\t{}\n\n\
             Decomposition patterns",
            group.order(),
            group.isomorphism_tag(),
            group.is_abelian(),
            group.is_perfect(),
            group.is_simple(),
            group.is_solvable(),
        );
        text.push_str("\n\n");
        text.push_str(&self.direct_decompose(group));
        text.push_str("\n\n");
        text.push_str(&self.semidirect_decompose(group));
        text
    }

    fn elements(&self, group: &Subgroup) -> String {
        let mut elements = group.elements().to_vec();
        elements.sort_unstable();
        format!(
            "Elements of {}:\n{:?}",
            self.display_name(group),
            elements
        )
    }

    fn cayley_table(&self, group: &Subgroup) -> String {
        let master = &self.master;
        let elements = group.elements();
        let mut rows = Vec::with_capacity(elements.len());
        for &a in elements {
            let row: Vec<usize> = elements.iter().map(|&b| master.index_prod(a, b)).collect();
            rows.push(row);
        }
        format!("Cayley table of {}:\n{:?}", self.display_name(group), rows)
    }

    fn conj_class(&self, group: &Subgroup) -> String {
        let master = &self.master;
        let mut text = format!(
            "Conjugacy classes of {}:\nOrder\tSize\tElements",
            self.display_name(group)
        );
        for class in group.conjugacy_classes() {
            let order = master.index_order(class[0]);
            text.push_str(&format!("\n{order}\t{}\t{:?}", class.len(), class));
        }
        text
    }

    fn conj_count(&self, group: &Subgroup) -> String {
        format!(
            "Conjugacy count of {}:\n(order, size, multiplicity)\n{:?}",
            self.display_name(group),
            group.conjugacy_count()
        )
    }

    fn isomorphic(&self, group: &Subgroup) -> String {
        format!(
            "Isomorphism type of {}: {}",
            self.display_name(group),
            group.isomorphism_tag()
        )
    }

    fn is_abelian(&self, group: &Subgroup) -> String {
        let verdict = if group.is_abelian() { "abelian" } else { "non-abelian" };
        format!("{} is {verdict}.", self.display_name(group))
    }

    fn is_perfect(&self, group: &Subgroup) -> String {
        let verdict = if group.is_perfect() { "perfect" } else { "not perfect" };
        format!("{} is {verdict}.", self.display_name(group))
    }

    fn is_solvable(&self, group: &Subgroup) -> String {
        let verdict = if group.is_solvable() { "solvable" } else { "not solvable" };
        format!("{} is {verdict}.", self.display_name(group))
    }

    fn is_simple(&self, group: &Subgroup) -> String {
        let verdict = if group.is_simple() { "is" } else { "is not" };
        format!("{} {verdict} simple.", self.display_name(group))
    }

    fn summarize(&self, group: &Subgroup) -> String {
        format!(
            "{}\t{}\t{}",
            self.display_name(group),
            group.order(),
            group.isomorphism_tag()
        )
    }

    fn center(&self, group: &Subgroup) -> String {
        format!(
            "Center of {}:\nName\tOrder\tIsomorphic\n{}",
            self.display_name(group),
            self.summarize(&group.center())
        )
    }

    fn centralizer(&self, group: &Subgroup) -> String {
        let centralizer = group.centralizer_in_master();
        format!(
            "Centralizer of {} in the master group:\nName\tOrder\tIsomorphic\n{}",
            self.display_name(group),
            self.summarize(&centralizer)
        )
    }

    fn derived(&self, group: &Subgroup) -> String {
        format!(
            "Derived subgroup of {}:\nName\tOrder\tIsomorphic\n{}",
            self.display_name(group),
            self.summarize(&group.derived())
        )
    }

    fn derived_series(&self, group: &Subgroup) -> String {
        let mut text = format!(
            "Derived series of {}:\nName\tOrder\tIsomorphic",
            self.display_name(group)
        );
        for g in group.derived_series() {
            text.push('\n');
            text.push_str(&self.summarize(g));
        }
        text
    }

    fn normal(&self, group: &Subgroup) -> String {
        let mut text = format!(
            "Normal subgroups of {}:\nName\tOrder\tIsAbelian\tIsomorphic",
            self.display_name(group)
        );
        for g in group.all_normal_subgroups() {
            let is_abelian = if g.is_abelian() { "abelian" } else { "non-abelian" };
            text.push_str(&format!(
                "\n{}\t{}\t{is_abelian}\t{}",
                self.display_name(g),
                g.order(),
                g.isomorphism_tag()
            ));
        }
        text
    }

    fn direct_decompose(&self, group: &Subgroup) -> String {
        let pairs = group.direct_product();
        let mut text = format!(
            "Direct product decomposition of {} ('x' means '×'):\nName(Order)",
            self.display_name(group)
        );
        if pairs.is_empty() {
            text.push_str("\nno decomposition found");
            return text;
        }
        for (left, right) in pairs {
            text.push_str(&format!(
                "\n{}({}) x {}({})\t<==> ( {} ) x ( {} )",
                self.display_name(&left),
                left.order(),
                self.display_name(&right),
                right.order(),
                left.isomorphism_tag(),
                right.isomorphism_tag(),
            ));
        }
        text
    }

    fn semidirect_decompose(&self, group: &Subgroup) -> String {
        let pairs = group.semidirect_product();
        let mut text = format!(
            "Semidirect product decomposition of {} ('r' means '⋊'):\nName(Order)",
            self.display_name(group)
        );
        if pairs.is_empty() {
            text.push_str("\nno decomposition found");
            return text;
        }
        for (left, right) in pairs {
            text.push_str(&format!(
                "\n{}({}) r {}({})\t<==> ( {} ) r ( {} )",
                self.display_name(&left),
                left.order(),
                self.display_name(&right),
                right.order(),
                left.isomorphism_tag(),
                right.isomorphism_tag(),
            ));
        }
        text
    }

    fn decompose(&self, group: &Subgroup) -> String {
        format!(
            "Decomposition of {}:\n{}\n\n{}",
            self.display_name(group),
            self.direct_decompose(group),
            self.semidirect_decompose(group)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{Matrix, MatrixClosureConfig};
    use num_complex::Complex64;
    use std::f64::consts::PI;

    fn rotation(theta: f64) -> Matrix {
        let c = Complex64::new(theta.cos(), 0.0);
        let s = Complex64::new(theta.sin(), 0.0);
        Matrix::from_row_slice(2, 2, &[c, -s, s, c])
    }

    fn reflection() -> Matrix {
        Matrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(1.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(-1.0, 0.0),
            ],
        )
    }

    fn demo_service() -> Service {
        let config = MatrixClosureConfig::new(1e-4, 100).unwrap();
        let master = MasterGroup::generate(&[rotation(2.0 * PI / 3.0), reflection()], config).unwrap();
        let whole = master.whole_group().unwrap();
        whole.rename("D3");
        master.register_name("D3", whole);
        Service::new(master)
    }

    #[test]
    fn parse_error_on_malformed_command() {
        let service = demo_service();
        assert!(matches!(service.exec("Elements"), Err(Error::ParseError)));
    }

    #[test]
    fn unknown_group_is_reported() {
        let service = demo_service();
        assert!(matches!(
            service.exec("Elements[Ghost]"),
            Err(Error::UnknownGroup(_))
        ));
    }

    #[test]
    fn unknown_command_is_reported() {
        let service = demo_service();
        assert!(matches!(
            service.exec("Bogus[D3]"),
            Err(Error::UnknownCommand(_))
        ));
    }

    #[test]
    fn elements_command_lists_all_six() {
        let service = demo_service();
        let text = service.exec("Elements[D3]").unwrap();
        assert!(text.contains("Elements of D3"));
    }

    #[test]
    fn is_abelian_reports_non_abelian_for_d3() {
        let service = demo_service();
        let text = service.exec("IsAbelian[D3]").unwrap();
        assert!(text.contains("non-abelian"));
    }
}
