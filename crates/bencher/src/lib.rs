#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    table: RouteTable,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, table: RouteTable) -> Self {
        Self { name, group, table }
    }

    pub fn small(name: &'static str, table: RouteTable) -> Self {
        Self::new(name, TestGroup::Small, table)
    }

    pub fn large(name: &'static str, table: RouteTable) -> Self {
        Self::new(name, TestGroup::Large, table)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }
}

/// Route patterns in `/a/:b/_/*` notation and request paths to look up.
#[derive(Debug, Copy, Clone)]
pub struct RouteTable {
    patterns: &'static [&'static str],
    lookups: &'static [&'static str],
}

impl RouteTable {
    pub const fn new(patterns: &'static [&'static str], lookups: &'static [&'static str]) -> Self {
        Self { patterns, lookups }
    }

    pub fn patterns(&self) -> &'static [&'static str] {
        self.patterns
    }

    pub fn lookups(&self) -> &'static [&'static str] {
        self.lookups
    }

    /// Segments of every pattern, without the leading empty one.
    pub fn segments(&self) -> impl Iterator<Item = Vec<&'static str>> + '_ {
        self.patterns.iter().map(|pattern| pattern.split('/').skip(1).filter(|segment| !segment.is_empty()).collect())
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Large,
}
