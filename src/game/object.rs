use crate::game::error::GameError;
use crate::game::memory::Memory;
use crate::game::Result;

/// The on-disk object table layout, fixed by the story version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Versions 1-3: 32 attributes, byte links, 31 properties.
    Small,
    /// Versions 4+: 48 attributes, word links, 63 properties.
    Large,
}

#[derive(Clone, Copy)]
enum Link {
    Parent = 0,
    Sibling = 1,
    Child = 2,
}

/// A property entry as found while scanning an object's property list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property {
    pub number: u16,
    pub size: usize,
    pub data_address: usize,
}

/// A view over the object table in the memory image. Holds no story data of
/// its own; every call borrows the memory for its duration.
#[derive(Debug, Clone, Copy)]
pub struct ObjectTable {
    table: usize,
    layout: Layout,
}

impl ObjectTable {
    pub fn new(table: usize, version: u8) -> ObjectTable {
        let layout = if version <= 3 {
            Layout::Small
        } else {
            Layout::Large
        };
        ObjectTable { table, layout }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    fn property_bits(&self) -> u32 {
        match self.layout {
            Layout::Small => 5,
            Layout::Large => 6,
        }
    }

    pub fn max_properties(&self) -> u16 {
        (1 << self.property_bits()) - 1
    }

    fn max_objects(&self) -> u16 {
        match self.layout {
            Layout::Small => 255,
            Layout::Large => 65535,
        }
    }

    pub fn max_attributes(&self) -> u16 {
        match self.layout {
            Layout::Small => 32,
            Layout::Large => 48,
        }
    }

    fn entry_size(&self) -> usize {
        match self.layout {
            Layout::Small => 9,
            Layout::Large => 14,
        }
    }

    fn default_property(&self, memory: &Memory, property: u16) -> Result<u16> {
        if property == 0 || property > self.max_properties() {
            return Err(GameError::invalid_operation(format!(
                "Property {} is out of range",
                property
            )));
        }
        memory.read_word(self.table + (property as usize - 1) * 2)
    }

    fn object_address(&self, object: u16) -> Result<usize> {
        if object == 0 || object > self.max_objects() {
            return Err(GameError::invalid_operation(format!(
                "Object {} is out of range",
                object
            )));
        }
        Ok(self.table
            + self.max_properties() as usize * 2
            + (object as usize - 1) * self.entry_size())
    }

    fn link_address(&self, object: u16, link: Link) -> Result<usize> {
        let base = self.object_address(object)? + self.max_attributes() as usize / 8;
        Ok(match self.layout {
            Layout::Small => base + link as usize,
            Layout::Large => base + link as usize * 2,
        })
    }

    fn link(&self, memory: &Memory, object: u16, link: Link) -> Result<u16> {
        if object == 0 {
            return Ok(0);
        }
        let address = self.link_address(object, link)?;
        match self.layout {
            Layout::Small => memory.read_byte(address).map(u16::from),
            Layout::Large => memory.read_word(address),
        }
    }

    fn set_link(&self, memory: &mut Memory, object: u16, link: Link, value: u16) -> Result<()> {
        if object == 0 {
            return Ok(());
        }
        let address = self.link_address(object, link)?;
        match self.layout {
            Layout::Small => memory.write_byte(address, value as u8),
            Layout::Large => memory.write_word(address, value),
        }
    }

    fn attribute_location(&self, object: u16, attribute: u16) -> Result<(usize, u8)> {
        if attribute >= self.max_attributes() {
            return Err(GameError::invalid_operation(format!(
                "Attribute {} is out of range",
                attribute
            )));
        }
        let address = self.object_address(object)? + attribute as usize / 8;
        Ok((address, 1 << (7 - attribute % 8)))
    }

    pub fn attribute(&self, memory: &Memory, object: u16, attribute: u16) -> Result<bool> {
        if object == 0 {
            return Ok(false);
        }
        let (address, mask) = self.attribute_location(object, attribute)?;
        Ok(memory.read_byte(address)? & mask != 0)
    }

    pub fn set_attribute(
        &self,
        memory: &mut Memory,
        object: u16,
        attribute: u16,
        value: bool,
    ) -> Result<()> {
        if object == 0 {
            return Ok(());
        }
        let (address, mask) = self.attribute_location(object, attribute)?;
        let byte = memory.read_byte(address)?;
        let byte = if value { byte | mask } else { byte & !mask };
        memory.write_byte(address, byte)
    }

    pub fn parent(&self, memory: &Memory, object: u16) -> Result<u16> {
        self.link(memory, object, Link::Parent)
    }

    pub fn sibling(&self, memory: &Memory, object: u16) -> Result<u16> {
        self.link(memory, object, Link::Sibling)
    }

    pub fn child(&self, memory: &Memory, object: u16) -> Result<u16> {
        self.link(memory, object, Link::Child)
    }

    pub fn set_parent(&self, memory: &mut Memory, object: u16, value: u16) -> Result<()> {
        self.set_link(memory, object, Link::Parent, value)
    }

    pub fn set_sibling(&self, memory: &mut Memory, object: u16, value: u16) -> Result<()> {
        self.set_link(memory, object, Link::Sibling, value)
    }

    pub fn set_child(&self, memory: &mut Memory, object: u16, value: u16) -> Result<()> {
        self.set_link(memory, object, Link::Child, value)
    }

    /// Detach an object from its parent, leaving it with no parent or sibling.
    pub fn remove(&self, memory: &mut Memory, object: u16) -> Result<()> {
        if object == 0 {
            return Ok(());
        }
        let parent = self.parent(memory, object)?;
        if parent == 0 {
            return Ok(());
        }

        let next = self.sibling(memory, object)?;
        let mut previous = 0;
        let mut current = self.child(memory, parent)?;
        let mut steps = 0usize;
        while current != 0 {
            if current == object {
                if previous == 0 {
                    self.set_child(memory, parent, next)?;
                } else {
                    self.set_sibling(memory, previous, next)?;
                }
                self.set_parent(memory, object, 0)?;
                self.set_sibling(memory, object, 0)?;
                return Ok(());
            }
            steps += 1;
            if steps > self.max_objects() as usize {
                break;
            }
            previous = current;
            current = self.sibling(memory, current)?;
        }
        Err(GameError::CorruptObjectTree(object))
    }

    /// Make `object` the first child of `parent`, detaching it from wherever it was.
    pub fn insert(&self, memory: &mut Memory, object: u16, parent: u16) -> Result<()> {
        if object == 0 || parent == 0 {
            return Ok(());
        }
        self.remove(memory, object)?;
        let first = self.child(memory, parent)?;
        self.set_parent(memory, object, parent)?;
        self.set_sibling(memory, object, first)?;
        self.set_child(memory, parent, object)
    }

    pub fn property_table(&self, memory: &Memory, object: u16) -> Result<usize> {
        let offset = match self.layout {
            Layout::Small => 7,
            Layout::Large => 12,
        };
        Ok(memory.read_word(self.object_address(object)? + offset)?.into())
    }

    /// The address of the object's encoded short name, and its length in words.
    pub fn name(&self, memory: &Memory, object: u16) -> Result<(usize, usize)> {
        let table = self.property_table(memory, object)?;
        let words = memory.read_byte(table)? as usize;
        Ok((table + 1, words))
    }

    /// Decode the property header at `address`, returning the entry (or `None`
    /// at the terminating zero byte) and the address after the header.
    fn read_property(&self, memory: &Memory, address: usize) -> Result<Option<Property>> {
        let mut cursor = address;
        let id = memory.fetch_byte(&mut cursor)?;
        if id == 0 {
            return Ok(None);
        }
        let number = u16::from(id) & self.max_properties();
        let size = match self.layout {
            Layout::Small => (id >> 5) as usize + 1,
            Layout::Large => {
                if id & 0x80 != 0 {
                    match memory.fetch_byte(&mut cursor)? & 0x3f {
                        0 => 64,
                        size => size as usize,
                    }
                } else {
                    ((id >> 6) & 1) as usize + 1
                }
            }
        };
        Ok(Some(Property {
            number,
            size,
            data_address: cursor,
        }))
    }

    fn first_property_address(&self, memory: &Memory, object: u16) -> Result<usize> {
        let (name, words) = self.name(memory, object)?;
        Ok(name + words * 2)
    }

    /// Walk the property list, which is stored in descending order.
    pub fn properties(&self, memory: &Memory, object: u16) -> Result<Vec<Property>> {
        let mut address = self.first_property_address(memory, object)?;
        let mut result = Vec::new();
        while let Some(property) = self.read_property(memory, address)? {
            address = property.data_address + property.size;
            result.push(property);
            if result.len() > self.max_properties() as usize {
                return Err(GameError::CorruptObjectTree(object));
            }
        }
        Ok(result)
    }

    pub fn find_property(
        &self,
        memory: &Memory,
        object: u16,
        property: u16,
    ) -> Result<Option<Property>> {
        let mut address = self.first_property_address(memory, object)?;
        while let Some(entry) = self.read_property(memory, address)? {
            if entry.number == property {
                return Ok(Some(entry));
            }
            if entry.number < property {
                break;
            }
            address = entry.data_address + entry.size;
        }
        Ok(None)
    }

    /// Property value, falling back to the defaults table.
    pub fn property(&self, memory: &Memory, object: u16, property: u16) -> Result<u16> {
        if object == 0 {
            return Ok(0);
        }
        match self.find_property(memory, object, property)? {
            None => self.default_property(memory, property),
            Some(Property {
                size: 1,
                data_address,
                ..
            }) => memory.read_byte(data_address).map(u16::from),
            Some(Property { data_address, .. }) => memory.read_word(data_address),
        }
    }

    /// Overwrite an existing property. Properties cannot be added at runtime.
    pub fn set_property(
        &self,
        memory: &mut Memory,
        object: u16,
        property: u16,
        value: u16,
    ) -> Result<()> {
        if object == 0 {
            return Ok(());
        }
        match self.find_property(memory, object, property)? {
            None => Err(GameError::MissingProperty { object, property }),
            Some(Property {
                size: 1,
                data_address,
                ..
            }) => memory.write_byte(data_address, value as u8),
            Some(Property {
                size, data_address, ..
            }) => {
                if size > 2 {
                    tracing::warn!(
                        "put_prop on {}-byte property {} of object {}",
                        size,
                        property,
                        object
                    );
                }
                memory.write_word(data_address, value)
            }
        }
    }

    pub fn property_address(&self, memory: &Memory, object: u16, property: u16) -> Result<u16> {
        if object == 0 {
            return Ok(0);
        }
        Ok(self
            .find_property(memory, object, property)?
            .map(|p| p.data_address as u16)
            .unwrap_or(0))
    }

    /// The number of the property after `property`, the first property when
    /// `property` is 0, or 0 at the end of the list.
    pub fn next_property(&self, memory: &Memory, object: u16, property: u16) -> Result<u16> {
        if object == 0 {
            return Ok(0);
        }
        let mut address = self.first_property_address(memory, object)?;
        while let Some(entry) = self.read_property(memory, address)? {
            if property == 0 || entry.number < property {
                return Ok(entry.number);
            }
            address = entry.data_address + entry.size;
        }
        Ok(0)
    }

    /// Size of the property whose data starts at `data_address`.
    pub fn property_size(&self, memory: &Memory, data_address: usize) -> Result<u16> {
        if data_address == 0 {
            return Ok(0);
        }
        let id = memory.read_byte(data_address - 1)?;
        let size = match self.layout {
            Layout::Small => u16::from(id >> 5) + 1,
            Layout::Large => {
                if id & 0x80 != 0 {
                    match id & 0x3f {
                        0 => 64,
                        size => u16::from(size),
                    }
                } else {
                    u16::from((id >> 6) & 1) + 1
                }
            }
        };
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::header;

    const TABLE: usize = 0x100;

    /// Builds a small object table: object 1 is the root holding 2 and 3.
    fn small_memory() -> (Memory, ObjectTable) {
        let mut data = vec![0u8; 0x800];
        data[header::VERSION] = 3;
        data[header::FILE_LENGTH] = 0x04;
        let table = ObjectTable::new(TABLE, 3);

        // Default for property 5
        data[TABLE + 8..TABLE + 10].copy_from_slice(&0x00ffu16.to_be_bytes());

        let objects = TABLE + 31 * 2;
        let property_tables = [0x300usize, 0x310, 0x320, 0x330];
        for (i, props) in property_tables.iter().enumerate() {
            let entry = objects + i * 9;
            data[entry + 7..entry + 9].copy_from_slice(&(*props as u16).to_be_bytes());
        }
        // object 1: parent 0, sibling 0, child 2
        data[objects + 6] = 2;
        // object 2: parent 1, sibling 3
        data[objects + 9 + 4] = 1;
        data[objects + 9 + 5] = 3;
        // object 3: parent 1
        data[objects + 18 + 4] = 1;

        // object 2 properties: 1-word name, prop 10 (2 bytes), prop 4 (1 byte)
        data[0x310] = 1;
        data[0x311..0x313].copy_from_slice(&0x94a5u16.to_be_bytes());
        data[0x313] = (1 << 5) | 10;
        data[0x314..0x316].copy_from_slice(&0x1234u16.to_be_bytes());
        data[0x316] = 4;
        data[0x317] = 0xab;
        data[0x318] = 0;

        let memory = Memory::new(&data).unwrap();
        (memory, table)
    }

    fn children(table: &ObjectTable, memory: &Memory, parent: u16) -> Vec<u16> {
        let mut result = Vec::new();
        let mut current = table.child(memory, parent).unwrap();
        while current != 0 {
            result.push(current);
            current = table.sibling(memory, current).unwrap();
        }
        result
    }

    #[test]
    fn null_object_is_inert() {
        let (mut memory, table) = small_memory();
        assert!(!table.attribute(&memory, 0, 3).unwrap());
        table.set_attribute(&mut memory, 0, 3, true).unwrap();
        assert_eq!(table.parent(&memory, 0).unwrap(), 0);
        table.remove(&mut memory, 0).unwrap();
        table.insert(&mut memory, 0, 1).unwrap();
        table.insert(&mut memory, 2, 0).unwrap();
        assert_eq!(table.parent(&memory, 2).unwrap(), 1);
        assert_eq!(table.property(&memory, 0, 5).unwrap(), 0);
    }

    #[test]
    fn attributes_are_msb_first() {
        let (mut memory, table) = small_memory();
        table.set_attribute(&mut memory, 2, 0, true).unwrap();
        table.set_attribute(&mut memory, 2, 9, true).unwrap();
        let entry = TABLE + 31 * 2 + 9;
        assert_eq!(memory.read_byte(entry).unwrap(), 0x80);
        assert_eq!(memory.read_byte(entry + 1).unwrap(), 0x40);
        assert!(table.attribute(&memory, 2, 9).unwrap());
        table.set_attribute(&mut memory, 2, 9, false).unwrap();
        assert!(!table.attribute(&memory, 2, 9).unwrap());
        assert!(table.attribute(&memory, 2, 32).is_err());
    }

    #[test]
    fn insert_makes_first_child() {
        let (mut memory, table) = small_memory();
        table.insert(&mut memory, 3, 2).unwrap();
        assert_eq!(table.parent(&memory, 3).unwrap(), 2);
        assert_eq!(children(&table, &memory, 2), vec![3]);
        assert_eq!(children(&table, &memory, 1), vec![2]);

        table.insert(&mut memory, 4, 1).unwrap();
        table.insert(&mut memory, 3, 1).unwrap();
        assert_eq!(children(&table, &memory, 1), vec![3, 4, 2]);
        assert!(children(&table, &memory, 2).is_empty());
    }

    #[test]
    fn reinsert_into_same_parent_appears_once() {
        let (mut memory, table) = small_memory();
        table.insert(&mut memory, 3, 1).unwrap();
        table.insert(&mut memory, 3, 1).unwrap();
        assert_eq!(children(&table, &memory, 1), vec![3, 2]);
    }

    #[test]
    fn remove_unlinks_middle_and_head() {
        let (mut memory, table) = small_memory();
        table.insert(&mut memory, 4, 1).unwrap();
        assert_eq!(children(&table, &memory, 1), vec![4, 2, 3]);
        table.remove(&mut memory, 2).unwrap();
        assert_eq!(table.parent(&memory, 2).unwrap(), 0);
        assert_eq!(table.sibling(&memory, 2).unwrap(), 0);
        assert_eq!(children(&table, &memory, 1), vec![4, 3]);
        table.remove(&mut memory, 4).unwrap();
        assert_eq!(children(&table, &memory, 1), vec![3]);
    }

    #[test]
    fn remove_detects_corrupt_tree() {
        let (mut memory, table) = small_memory();
        // object 4 claims parent 2, which has no children
        table.set_parent(&mut memory, 4, 2).unwrap();
        assert!(matches!(
            table.remove(&mut memory, 4),
            Err(GameError::CorruptObjectTree(4))
        ));
    }

    #[test]
    fn property_lookup_and_defaults() {
        let (memory, table) = small_memory();
        assert_eq!(table.property(&memory, 2, 10).unwrap(), 0x1234);
        assert_eq!(table.property(&memory, 2, 4).unwrap(), 0xab);
        assert_eq!(table.property(&memory, 2, 5).unwrap(), 0x00ff);
        // object 3 has an empty property list
        assert_eq!(table.property(&memory, 3, 5).unwrap(), 0x00ff);
    }

    #[test]
    fn property_addresses_and_sizes() {
        let (memory, table) = small_memory();
        assert_eq!(table.property_address(&memory, 2, 10).unwrap(), 0x314);
        assert_eq!(table.property_address(&memory, 2, 4).unwrap(), 0x317);
        assert_eq!(table.property_address(&memory, 2, 7).unwrap(), 0);
        assert_eq!(table.property_size(&memory, 0x314).unwrap(), 2);
        assert_eq!(table.property_size(&memory, 0x317).unwrap(), 1);
        assert_eq!(table.property_size(&memory, 0).unwrap(), 0);
        assert_eq!(table.next_property(&memory, 2, 0).unwrap(), 10);
        assert_eq!(table.next_property(&memory, 2, 10).unwrap(), 4);
        assert_eq!(table.next_property(&memory, 2, 4).unwrap(), 0);
    }

    #[test]
    fn set_property_requires_existing_key() {
        let (mut memory, table) = small_memory();
        table.set_property(&mut memory, 2, 4, 0x1cd).unwrap();
        assert_eq!(table.property(&memory, 2, 4).unwrap(), 0xcd);
        table.set_property(&mut memory, 2, 10, 0xbeef).unwrap();
        assert_eq!(table.property(&memory, 2, 10).unwrap(), 0xbeef);
        assert!(matches!(
            table.set_property(&mut memory, 2, 5, 1),
            Err(GameError::MissingProperty {
                object: 2,
                property: 5
            })
        ));
    }

    #[test]
    fn large_layout_property_headers() {
        let mut data = vec![0u8; 0x800];
        data[header::VERSION] = 5;
        data[header::FILE_LENGTH] = 0x02;
        let table = ObjectTable::new(TABLE, 5);
        let entry = TABLE + 63 * 2;
        data[entry + 12..entry + 14].copy_from_slice(&0x400u16.to_be_bytes());
        // no name; prop 40 with explicit size 5; prop 20 two bytes; prop 3 one byte
        data[0x400] = 0;
        data[0x401] = 0x80 | 40;
        data[0x402] = 0x80 | 5;
        data[0x408] = 0x40 | 20;
        data[0x409..0x40b].copy_from_slice(&0x5678u16.to_be_bytes());
        data[0x40b] = 3;
        data[0x40c] = 0x11;
        data[0x40d] = 0;
        let memory = Memory::new(&data).unwrap();

        assert_eq!(table.layout(), Layout::Large);
        let properties = table.properties(&memory, 1).unwrap();
        let numbers: Vec<u16> = properties.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![40, 20, 3]);
        assert_eq!(properties[0].size, 5);
        assert_eq!(table.property_size(&memory, 0x403).unwrap(), 5);
        assert_eq!(table.property_size(&memory, 0x409).unwrap(), 2);
        assert_eq!(table.property(&memory, 1, 20).unwrap(), 0x5678);
        assert_eq!(table.property(&memory, 1, 3).unwrap(), 0x11);
    }
}
